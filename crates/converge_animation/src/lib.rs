//! Converge Animation System
//!
//! Declarative timelines and the frame-driven scheduler that plays them.
//!
//! # Features
//!
//! - **Timelines**: `(element, mutation, offset, duration)` entries interpreted in order
//! - **Easing**: the cubic/expo/back curves the choreography uses
//! - **Scheduler**: generation-tagged playback, so superseded cycles go quiet
//! - **Render boundary**: hosts expose elements through `RenderTarget`

pub mod easing;
pub mod presets;
pub mod property;
pub mod scheduler;
pub mod target;
pub mod timeline;

pub use easing::Easing;
pub use presets::AnimationPreset;
pub use property::{Attribute, Value};
pub use scheduler::{AnimationScheduler, Completion, TimelineId};
pub use target::{apply_write, ElementHandle, RenderTarget, Write};
pub use timeline::{Mutation, MutationSink, Timeline, TimelineEntry, TimelineEntryId};
