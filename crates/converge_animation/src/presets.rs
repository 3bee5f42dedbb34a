//! Animation presets for common entry/exit patterns
//!
//! Each preset appends entries for one element to an existing timeline at a
//! given offset, so choreography code reads as a list of beats.

use crate::easing::Easing;
use crate::property::Attribute;
use crate::timeline::Timeline;
use converge_core::ElementId;

/// Pre-built animation presets for common patterns
pub struct AnimationPreset;

impl AnimationPreset {
    // ========================================================================
    // Visibility
    // ========================================================================

    /// Hide instantly (scale and opacity to zero)
    pub fn hide(timeline: &mut Timeline, element: &ElementId, offset_ms: u32) {
        timeline.set(element, Attribute::Scale, 0.0, offset_ms);
        timeline.set(element, Attribute::Opacity, 0.0, offset_ms);
    }

    /// Scale and fade in from nothing
    pub fn scale_in(
        timeline: &mut Timeline,
        element: &ElementId,
        offset_ms: u32,
        duration_ms: u32,
        easing: Easing,
    ) {
        timeline.from_to(element, Attribute::Scale, 0.0, 1.0, offset_ms, duration_ms, easing);
        timeline.from_to(element, Attribute::Opacity, 0.0, 1.0, offset_ms, duration_ms, easing);
    }

    /// Pop in with a slight overshoot
    pub fn pop_in(timeline: &mut Timeline, element: &ElementId, offset_ms: u32, duration_ms: u32) {
        Self::scale_in(timeline, element, offset_ms, duration_ms, Easing::EaseOutBack(1.7));
    }

    /// Scale in several elements one after another
    pub fn stagger_scale_in<'a>(
        timeline: &mut Timeline,
        elements: impl IntoIterator<Item = &'a ElementId>,
        offset_ms: u32,
        duration_ms: u32,
        stagger_ms: u32,
        easing: Easing,
    ) {
        let mut at = offset_ms;
        for element in elements {
            Self::scale_in(timeline, element, at, duration_ms, easing);
            at = at.saturating_add(stagger_ms);
        }
    }

    // ========================================================================
    // Emphasis
    // ========================================================================

    /// Shrink to `scale` and come back to full size.
    ///
    /// The shrink starts from whatever scale the element has at that moment.
    pub fn pulse(
        timeline: &mut Timeline,
        element: &ElementId,
        offset_ms: u32,
        scale: f64,
        half_duration_ms: u32,
    ) {
        timeline.to(
            element,
            Attribute::Scale,
            scale,
            offset_ms,
            half_duration_ms,
            Easing::POWER2_IN_OUT,
        );
        timeline.to(
            element,
            Attribute::Scale,
            1.0,
            offset_ms.saturating_add(half_duration_ms),
            half_duration_ms,
            Easing::POWER2_OUT,
        );
    }

    // ========================================================================
    // Lines
    // ========================================================================

    /// Grow a line's width from zero to `length`.
    ///
    /// Lines that start late are collapsed at time zero so they are not seen
    /// at a stale length while waiting.
    pub fn grow_width(
        timeline: &mut Timeline,
        element: &ElementId,
        length: f64,
        offset_ms: u32,
        duration_ms: u32,
        easing: Easing,
    ) {
        if offset_ms > 0 {
            timeline.set(element, Attribute::Width, 0.0, 0);
        }
        timeline.from_to(element, Attribute::Width, 0.0, length, offset_ms, duration_ms, easing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Value;
    use crate::timeline::Mutation;

    #[test]
    fn test_stagger_offsets() {
        let mut tl = Timeline::new();
        let ids = [ElementId::new("a"), ElementId::new("b"), ElementId::new("c")];
        AnimationPreset::stagger_scale_in(&mut tl, &ids, 3000, 1000, 50, Easing::EaseOutExpo);

        let starts: Vec<(String, u32)> = tl
            .entries()
            .filter(|e| e.attribute() == Some(Attribute::Scale))
            .map(|e| (e.element.to_string(), e.offset_ms))
            .collect();
        assert_eq!(
            starts,
            vec![
                ("a".to_string(), 3000),
                ("b".to_string(), 3050),
                ("c".to_string(), 3100)
            ]
        );
        assert_eq!(tl.duration_ms(), 4100);
    }

    #[test]
    fn test_pulse_starts_from_current_scale() {
        let mut tl = Timeline::new();
        AnimationPreset::pulse(&mut tl, &ElementId::new("logo"), 0, 0.85, 300);

        let shapes: Vec<_> = tl
            .entries()
            .map(|e| match &e.mutation {
                Mutation::Tween { from, to, .. } => (e.offset_ms, *from, *to),
                Mutation::Image(_) => unreachable!(),
            })
            .collect();
        assert_eq!(
            shapes,
            vec![
                (0, None, Value::Scalar(0.85)),
                (300, None, Value::Scalar(1.0))
            ]
        );
        assert_eq!(tl.find_overlap(), None);
    }

    #[test]
    fn test_grow_width_collapses_late_lines() {
        let mut tl = Timeline::new();
        AnimationPreset::grow_width(&mut tl, &ElementId::new("line-2"), 640.0, 200, 1000, Easing::POWER2_OUT);
        let offsets: Vec<u32> = tl.entries().map(|e| e.offset_ms).collect();
        assert_eq!(offsets, vec![0, 200]);
        assert_eq!(tl.find_overlap(), None);
    }
}
