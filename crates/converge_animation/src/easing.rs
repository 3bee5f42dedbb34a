//! Easing functions for animations
//!
//! The `power` family follows the usual web-animation naming, where `power2`
//! is cubic. Only the curves the choreography needs are provided.

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    /// Exponential deceleration (`expo.out`)
    EaseOutExpo,
    /// Overshoots the target then settles (`back.out(overshoot)`)
    EaseOutBack(f64),
}

impl Easing {
    /// `power2.in`
    pub const POWER2_IN: Easing = Easing::EaseInCubic;
    /// `power2.out`
    pub const POWER2_OUT: Easing = Easing::EaseOutCubic;
    /// `power2.inOut`
    pub const POWER2_IN_OUT: Easing = Easing::EaseInOutCubic;

    /// Eased progress for `t`, clamped to 0.0..=1.0 first
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Easing::EaseOutBack(overshoot) => {
                let c3 = overshoot + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u.powi(3) + overshoot * u.powi(2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 6] = [
        Easing::Linear,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseOutExpo,
        Easing::EaseOutBack(1.7),
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-9, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        for easing in ALL {
            assert_eq!(easing.apply(-0.5), easing.apply(0.0));
            assert_eq!(easing.apply(1.5), easing.apply(1.0));
        }
    }

    #[test]
    fn test_power2_in_out_is_symmetric() {
        let e = Easing::POWER2_IN_OUT;
        assert!((e.apply(0.5) - 0.5).abs() < 1e-12);
        for t in [0.1, 0.25, 0.4] {
            assert!((e.apply(t) + e.apply(1.0 - t) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_back_out_overshoots() {
        let e = Easing::EaseOutBack(1.7);
        let peak = (1..100)
            .map(|i| e.apply(i as f64 / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_expo_out_front_loaded() {
        let e = Easing::EaseOutExpo;
        assert!(e.apply(0.2) > 0.7);
        assert!(e.apply(0.5) > 0.96);
    }
}
