//! Assertion helpers for headless runs.

use crate::recording::RecordingTarget;
use crate::sequencer::CycleState;

/// Assertion result with structured failure details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionResult {
    Passed,
    Failed { code: String, message: String },
}

fn failed(code: &str, message: String) -> AssertionResult {
    AssertionResult::Failed {
        code: code.to_string(),
        message,
    }
}

fn missing(id: &str) -> AssertionResult {
    failed("missing_element", format!("{id}: element not attached"))
}

pub fn evaluate_assert_visible(id: &str, target: &RecordingTarget) -> AssertionResult {
    let Some(element) = target.get(id) else {
        return missing(id);
    };
    if element.is_visible() {
        AssertionResult::Passed
    } else {
        failed(
            "not_visible",
            format!(
                "{id}: expected visible, scale {:?} opacity {:?}",
                element.scale, element.opacity
            ),
        )
    }
}

pub fn evaluate_assert_hidden(id: &str, target: &RecordingTarget) -> AssertionResult {
    let Some(element) = target.get(id) else {
        return missing(id);
    };
    if element.is_visible() {
        failed(
            "not_hidden",
            format!(
                "{id}: expected hidden, scale {:?} opacity {:?}",
                element.scale, element.opacity
            ),
        )
    } else {
        AssertionResult::Passed
    }
}

pub fn evaluate_assert_position(
    id: &str,
    x: f64,
    y: f64,
    tolerance: f64,
    target: &RecordingTarget,
) -> AssertionResult {
    let Some(element) = target.get(id) else {
        return missing(id);
    };
    let Some(position) = element.position else {
        return failed("missing_position", format!("{id}: position never written"));
    };
    if (position.x - x).abs() <= tolerance && (position.y - y).abs() <= tolerance {
        AssertionResult::Passed
    } else {
        failed(
            "position_mismatch",
            format!(
                "{id}: expected ({x}, {y}) +/- {tolerance}, got ({}, {})",
                position.x, position.y
            ),
        )
    }
}

pub fn evaluate_assert_state(expected: &str, actual: CycleState) -> AssertionResult {
    let actual_name = state_name(actual);
    if expected.eq_ignore_ascii_case(actual_name) {
        AssertionResult::Passed
    } else {
        failed(
            "state_mismatch",
            format!("expected cycle state '{expected}', got '{actual_name}'"),
        )
    }
}

/// Lower-case name used in scenarios and reports
pub fn state_name(state: CycleState) -> &'static str {
    match state {
        CycleState::Idle => "idle",
        CycleState::Intro => "intro",
        CycleState::Looping => "looping",
        CycleState::Cancelled => "cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use converge_animation::RenderTarget;
    use converge_core::{ElementId, Point, Size};

    fn target() -> RecordingTarget {
        let mut target = RecordingTarget::with_elements(Size::new(100.0, 100.0), ["a"]);
        if let Some(handle) = target.element(&ElementId::new("a")) {
            handle.set_position(Point::new(10.0, 20.0));
            handle.set_opacity(0.0);
        }
        target
    }

    #[test]
    fn test_visibility_assertions() {
        let target = target();
        assert!(matches!(
            evaluate_assert_visible("a", &target),
            AssertionResult::Failed { code, .. } if code == "not_visible"
        ));
        assert_eq!(evaluate_assert_hidden("a", &target), AssertionResult::Passed);
        assert!(matches!(
            evaluate_assert_hidden("zzz", &target),
            AssertionResult::Failed { code, .. } if code == "missing_element"
        ));
    }

    #[test]
    fn test_position_tolerance() {
        let target = target();
        assert_eq!(
            evaluate_assert_position("a", 10.4, 19.6, 0.5, &target),
            AssertionResult::Passed
        );
        assert!(matches!(
            evaluate_assert_position("a", 12.0, 20.0, 0.5, &target),
            AssertionResult::Failed { .. }
        ));
    }

    #[test]
    fn test_state_assertion() {
        assert_eq!(
            evaluate_assert_state("Looping", CycleState::Looping),
            AssertionResult::Passed
        );
        assert!(matches!(
            evaluate_assert_state("intro", CycleState::Idle),
            AssertionResult::Failed { .. }
        ));
    }
}
