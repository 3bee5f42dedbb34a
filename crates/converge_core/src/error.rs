//! Error types
//!
//! None of these are fatal. Each names a condition the engine absorbs
//! locally (skip a write, skip a layout pass, drop a stale timeline) so the
//! caller can log it and carry on.

use crate::element::ElementId;
use thiserror::Error;

/// Conditions raised by layout and sequencing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// The element has no live handle in the render tree yet
    #[error("element `{0}` is not attached")]
    UnattachedTarget(ElementId),

    /// Container bounds are zero, negative or not finite
    #[error("invalid container bounds {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },

    /// A layout input produced a NaN or infinite coordinate
    #[error("non-finite geometry for `{0}`")]
    NonFiniteGeometry(String),

    /// Work was submitted for a cycle generation that has been cancelled
    #[error("generation {stale} is stale (active generation is {active})")]
    StaleGeneration { stale: u64, active: u64 },
}

/// Result type for layout and sequencing operations
pub type Result<T> = std::result::Result<T, AnimationError>;
