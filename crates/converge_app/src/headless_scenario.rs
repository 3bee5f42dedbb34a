//! Scenario definition for headless runs.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Sequence of headless steps.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadlessScenario {
    pub steps: Vec<ScenarioStep>,
}

impl HeadlessScenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_json(&raw)
    }
}

/// One scenario step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Advance logical time, split into frames of at most `tick_ms`.
    Wait { ms: u64 },
    /// Run whole frames.
    Tick { frames: u32 },
    /// Change the container size and notify the stage.
    Resize { width: f64, height: f64 },
    Attach,
    Detach,
    AssertVisible { id: String },
    AssertHidden { id: String },
    AssertPosition {
        id: String,
        x: f64,
        y: f64,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
    },
    /// Expected cycle state: `idle`, `intro`, `looping` or `cancelled`.
    AssertState { state: String },
}

fn default_tolerance() -> f64 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_every_step_kind() {
        let scenario = HeadlessScenario::from_json(
            r#"{"steps": [
                {"type": "wait", "ms": 100},
                {"type": "tick", "frames": 2},
                {"type": "resize", "width": 1200, "height": 900},
                {"type": "attach"},
                {"type": "detach"},
                {"type": "assert_visible", "id": "ball-1"},
                {"type": "assert_hidden", "id": "morph-element"},
                {"type": "assert_position", "id": "ball-2", "x": 225, "y": 296},
                {"type": "assert_state", "state": "looping"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(scenario.steps.len(), 9);
        assert!(matches!(
            scenario.steps[7],
            ScenarioStep::AssertPosition { tolerance, .. } if tolerance == 0.5
        ));
    }

    #[test]
    fn test_unknown_step_is_an_error() {
        assert!(HeadlessScenario::from_json(r#"{"steps": [{"type": "jump"}]}"#).is_err());
    }
}
