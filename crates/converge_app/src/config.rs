//! Stage configuration (converge.toml)
//!
//! Every section falls back to the stock animation, so an empty file is a
//! valid configuration.

use converge_core::ElementId;
use converge_layout::{FocalSpec, SceneConfig};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Problems found while loading or validating a [`StageConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("at least one ray pairing is required")]
    NoPairings,

    #[error("ray `{0}` has no balls")]
    EmptyRay(String),

    #[error("element id `{0}` is used more than once")]
    DuplicateElement(ElementId),

    #[error("ball `{ball}` starts at {start}, outside [0, 1]")]
    BallOutOfRange { ball: ElementId, start: f64 },

    #[error("ball `{ball}` has invalid size {size}")]
    InvalidBallSize { ball: ElementId, size: f64 },

    #[error("pairing names unknown {side} ray `{ray}`")]
    UnknownRay { ray: String, side: &'static str },

    #[error("cycle duration must be positive")]
    NonPositiveCycle,

    #[error("ray id `{0}` is used more than once")]
    DuplicateRay(String),

    #[error("`{field}` must be a finite number, got {value}")]
    NonFinite { field: String, value: f64 },
}

/// Top-level configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub elements: ElementIds,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub fan: FanConfig,
    #[serde(default = "default_pairings")]
    pub pairings: Vec<Pairing>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            elements: ElementIds::default(),
            timing: TimingConfig::default(),
            fan: FanConfig::default(),
            pairings: default_pairings(),
        }
    }
}

/// Host ids of the shared (non-ball) elements
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementIds {
    #[serde(default = "default_logo")]
    pub logo: ElementId,
    /// Container that spins and scales during the morph
    #[serde(default = "default_morph")]
    pub morph: ElementId,
    /// Image inside the morph container
    #[serde(default = "default_morph_image")]
    pub morph_image: ElementId,
    /// Conic-gradient ray fan
    #[serde(default = "default_fan")]
    pub fan: ElementId,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            logo: default_logo(),
            morph: default_morph(),
            morph_image: default_morph_image(),
            fan: default_fan(),
        }
    }
}

fn default_logo() -> ElementId {
    ElementId::new("center-logo")
}

fn default_morph() -> ElementId {
    ElementId::new("morph-element")
}

fn default_morph_image() -> ElementId {
    ElementId::new("morph-image")
}

fn default_fan() -> ElementId {
    ElementId::new("new-conic-rays")
}

/// Offsets and durations, all in milliseconds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub logo_pop_ms: u32,
    pub line_grow_ms: u32,
    pub line_stagger_ms: u32,
    pub fan_open_at_ms: u32,
    pub fan_open_ms: u32,
    pub fan_settle_at_ms: u32,
    pub fan_settle_ms: u32,
    pub balls_in_at_ms: u32,
    pub balls_in_ms: u32,
    pub balls_stagger_ms: u32,
    /// Spacing between ray pairings inside one loop iteration
    pub cycle_ms: u32,
    /// Pause after the last pairing before the loop repeats
    pub repeat_delay_ms: u32,
    pub shift_ms: u32,
    pub morph_at_ms: u32,
    pub left_respawn_at_ms: u32,
    pub left_respawn_ms: u32,
    pub right_respawn_at_ms: u32,
    pub right_respawn_ms: u32,
    /// How far past the ray end an exiting right ball travels
    pub right_overshoot: f64,
    pub pulse_scale: f64,
    pub pulse_half_ms: u32,
    /// Upper bound on loop iterations unrolled into one timeline
    pub max_unrolled_iterations: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            logo_pop_ms: 200,
            line_grow_ms: 1000,
            line_stagger_ms: 200,
            fan_open_at_ms: 1000,
            fan_open_ms: 1000,
            fan_settle_at_ms: 2000,
            fan_settle_ms: 1000,
            balls_in_at_ms: 3000,
            balls_in_ms: 1000,
            balls_stagger_ms: 50,
            cycle_ms: 4000,
            repeat_delay_ms: 500,
            shift_ms: 1500,
            morph_at_ms: 1500,
            left_respawn_at_ms: 3500,
            left_respawn_ms: 500,
            right_respawn_at_ms: 2500,
            right_respawn_ms: 1000,
            right_overshoot: 1.4,
            pulse_scale: 0.85,
            pulse_half_ms: 300,
            max_unrolled_iterations: 12,
        }
    }
}

/// Stop angles of the conic ray fan, in degrees
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanConfig {
    pub rest_angles: [f64; 6],
    pub burst_angles: [f64; 6],
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            rest_angles: [190.01, 201.022, 206.727, 209.902, 211.818, 220.13],
            burst_angles: [200.0, 205.0, 207.0, 208.0, 209.0, 212.0],
        }
    }
}

/// A left ray and the right ray it hands its morph over to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub left: String,
    pub right: String,
}

impl Pairing {
    pub fn new(left: &str, right: &str) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

fn default_pairings() -> Vec<Pairing> {
    vec![
        Pairing::new("line1", "right-line1"),
        Pairing::new("line2", "right-line2"),
        Pairing::new("line3", "right-line1"),
    ]
}

impl StageConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: StageConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pairings.is_empty() {
            return Err(ConfigError::NoPairings);
        }
        if self.timing.cycle_ms == 0 {
            return Err(ConfigError::NonPositiveCycle);
        }

        let scene = &self.scene;
        let rays = scene
            .left_rays
            .iter()
            .map(|ray| (&ray.id, ray.balls.is_empty()))
            .chain(scene.right_rays.iter().map(|ray| (&ray.id, ray.balls.is_empty())));
        for (id, empty) in rays {
            if empty {
                return Err(ConfigError::EmptyRay(id.clone()));
            }
        }

        let mut ray_ids = FxHashSet::default();
        let all_rays = scene
            .left_rays
            .iter()
            .map(|ray| &ray.id)
            .chain(scene.right_rays.iter().map(|ray| &ray.id));
        for id in all_rays {
            if !ray_ids.insert(id) {
                return Err(ConfigError::DuplicateRay(id.clone()));
            }
        }

        self.validate_finite()?;

        let mut seen = FxHashSet::default();
        let shared = [
            &self.elements.logo,
            &self.elements.morph,
            &self.elements.morph_image,
            &self.elements.fan,
        ];
        let lines = scene
            .left_rays
            .iter()
            .filter_map(|ray| ray.element.as_ref())
            .chain(scene.right_rays.iter().filter_map(|ray| ray.element.as_ref()));
        for id in shared.into_iter().chain(lines).chain(scene.balls().map(|b| &b.id)) {
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateElement(id.clone()));
            }
        }

        for ball in scene.balls() {
            if !(0.0..=1.0).contains(&ball.start) {
                return Err(ConfigError::BallOutOfRange {
                    ball: ball.id.clone(),
                    start: ball.start,
                });
            }
            if !ball.size.is_finite() || ball.size <= 0.0 {
                return Err(ConfigError::InvalidBallSize {
                    ball: ball.id.clone(),
                    size: ball.size,
                });
            }
        }

        for pairing in &self.pairings {
            if scene.left_ray(&pairing.left).is_none() {
                return Err(ConfigError::UnknownRay {
                    ray: pairing.left.clone(),
                    side: "left",
                });
            }
            if scene.right_ray(&pairing.right).is_none() {
                return Err(ConfigError::UnknownRay {
                    ray: pairing.right.clone(),
                    side: "right",
                });
            }
        }

        Ok(())
    }

    /// TOML accepts `nan` and `inf`; none of them may reach the layout engine
    fn validate_finite(&self) -> Result<(), ConfigError> {
        let scene = &self.scene;
        let mut fields: Vec<(String, f64)> = Vec::new();

        let (x, y) = match &scene.focal {
            FocalSpec::Percent { x, y } | FocalSpec::Anchor { x, y, .. } => (*x, *y),
        };
        fields.push(("scene.focal.x".to_string(), x));
        fields.push(("scene.focal.y".to_string(), y));
        fields.push((
            "scene.right_length_factor".to_string(),
            scene.right_length_factor,
        ));
        for ray in &scene.left_rays {
            fields.push((format!("{}.start_y_percent", ray.id), ray.start_y_percent));
        }
        for ray in &scene.right_rays {
            fields.push((format!("{}.angle_deg", ray.id), ray.angle_deg));
        }
        for (i, angle) in self.fan.rest_angles.iter().enumerate() {
            fields.push((format!("fan.rest_angles[{i}]"), *angle));
        }
        for (i, angle) in self.fan.burst_angles.iter().enumerate() {
            fields.push((format!("fan.burst_angles[{i}]"), *angle));
        }

        match fields.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((field, value)) => Err(ConfigError::NonFinite { field, value }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = StageConfig::from_toml_str("").unwrap();
        assert_eq!(config, StageConfig::default());
        assert_eq!(config.timing.cycle_ms, 4000);
        assert_eq!(config.pairings.len(), 3);
    }

    #[test]
    fn test_partial_timing_override() {
        let config = StageConfig::from_toml_str("[timing]\ncycle_ms = 3000\n").unwrap();
        assert_eq!(config.timing.cycle_ms, 3000);
        assert_eq!(config.timing.repeat_delay_ms, 500);
    }

    #[test]
    fn test_pairings_from_toml() {
        let config = StageConfig::from_toml_str(
            "[[pairings]]\nleft = \"line2\"\nright = \"right-line2\"\n",
        )
        .unwrap();
        assert_eq!(config.pairings, vec![Pairing::new("line2", "right-line2")]);
    }

    #[test]
    fn test_rejects_unknown_ray() {
        let err = StageConfig::from_toml_str(
            "[[pairings]]\nleft = \"right-line1\"\nright = \"right-line2\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRay { side: "left", .. }));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut config = StageConfig::default();
        config.elements.fan = ElementId::new("ball-3");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateElement(id)) if id.as_str() == "ball-3"
        ));
    }

    #[test]
    fn test_rejects_out_of_range_ball() {
        let mut config = StageConfig::default();
        config.scene.left_rays[0].balls[1].start = 1.2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BallOutOfRange { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_ray_and_missing_pairings() {
        let mut config = StageConfig::default();
        config.scene.right_rays[1].balls.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyRay(id)) if id == "right-line2"));

        config.pairings.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoPairings)));
    }

    #[test]
    fn test_rejects_zero_cycle() {
        assert!(matches!(
            StageConfig::from_toml_str("[timing]\ncycle_ms = 0\n"),
            Err(ConfigError::NonPositiveCycle)
        ));
    }

    #[test]
    fn test_rejects_non_finite_focal() {
        let err = StageConfig::from_toml_str("[scene.focal]\nkind = \"percent\"\nx = nan\ny = 70.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { ref field, .. } if field == "scene.focal.x"));
    }

    #[test]
    fn test_rejects_non_finite_ray_numbers() {
        let mut config = StageConfig::default();
        config.scene.right_rays[0].angle_deg = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field, .. }) if field == "right-line1.angle_deg"
        ));

        let mut config = StageConfig::default();
        config.scene.left_rays[2].start_y_percent = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::NonFinite { .. })));

        let mut config = StageConfig::default();
        config.scene.right_length_factor = f64::NEG_INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::NonFinite { .. })));
    }

    #[test]
    fn test_rejects_duplicate_ray_ids() {
        let mut config = StageConfig::default();
        config.scene.right_rays[1].id = "line2".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateRay(id)) if id == "line2"
        ));
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(matches!(
            StageConfig::from_toml_str("timing = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
