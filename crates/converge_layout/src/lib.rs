//! Converge Layout Engine
//!
//! Computes where every ray, ball and the focal point sit for a given
//! container size.
//!
//! # Example
//!
//! ```rust
//! use converge_core::Size;
//! use converge_layout::{LayoutEngine, LayoutInput, SceneConfig};
//!
//! let layout = LayoutEngine::compute(
//!     &SceneConfig::default(),
//!     LayoutInput::new(Size::new(1000.0, 800.0)),
//! )
//! .unwrap();
//! assert_eq!(layout.rays.len(), 5);
//! ```

pub mod config;
pub mod engine;
pub mod ray;

pub use config::{BallConfig, FocalSpec, LeftRayConfig, RightRayConfig, SceneConfig};
pub use engine::{BallPlacement, LayoutEngine, LayoutInput, SceneLayout};
pub use ray::{RayGeometry, RaySide};
