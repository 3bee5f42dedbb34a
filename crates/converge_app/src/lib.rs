//! Converge Stage
//!
//! Turns a scene configuration into a running animation: rays and balls are
//! laid out from the container bounds, the intro and loop timelines are
//! built from that layout, and a sequencer plays them one cycle at a time.
//!
//! # Example
//!
//! ```
//! use converge_app::prelude::*;
//!
//! let config = StageConfig::default();
//! let mut target = RecordingTarget::with_elements(Size::new(1000.0, 800.0), element_ids(&config));
//! let mut stage = Stage::new(config, BundledAssets::default());
//!
//! stage.dispatch(HostEvent::Mount, &mut target);
//! for _ in 0..10 {
//!     stage.frame(16.0, &mut target);
//! }
//! assert_eq!(stage.state(), CycleState::Intro);
//! ```

pub mod assets;
pub mod choreography;
pub mod config;
pub mod headless_assert;
pub mod headless_report;
pub mod headless_runner;
pub mod headless_runtime;
pub mod headless_scenario;
pub mod recording;
pub mod sequencer;
pub mod stage;

pub use assets::{AssetSource, BundledAssets};
pub use choreography::{build_plan, CyclePlan};
pub use config::{ConfigError, ElementIds, FanConfig, Pairing, StageConfig, TimingConfig};
pub use headless_runner::{element_ids, run_scenario, HeadlessSession, RunOutcome};
pub use recording::{RecordedElement, RecordingTarget};
pub use sequencer::{CycleHandle, CycleState, Sequencer};
pub use stage::Stage;

/// Prelude module - import everything a host needs
pub mod prelude {
    pub use crate::assets::{AssetSource, BundledAssets};
    pub use crate::config::StageConfig;
    pub use crate::headless_runner::element_ids;
    pub use crate::recording::RecordingTarget;
    pub use crate::sequencer::CycleState;
    pub use crate::stage::Stage;

    pub use converge_animation::{ElementHandle, RenderTarget};
    pub use converge_core::{ElementId, HostEvent, Point, Rect, Size};
}
