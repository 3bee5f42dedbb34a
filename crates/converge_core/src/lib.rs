//! Converge Core
//!
//! Foundational types shared by the layout engine and the sequencer:
//!
//! - **Geometry**: `Point`, `Size`, `Rect` in container pixels
//! - **Identity**: `ElementId` for render-tree elements, `AssetRef` for images
//! - **State Machines**: the `Idle -> Intro -> Looping -> Cancelled` cycle machine
//! - **Events**: host lifecycle notifications
//! - **Errors**: the locally absorbed failure conditions
//!
//! # Example
//!
//! ```rust
//! use converge_core::fsm::{cycle_events, cycle_states, StateMachine};
//!
//! let mut cycle = StateMachine::cycle();
//! cycle.send(cycle_events::START);
//! assert!(cycle.is_in(cycle_states::INTRO));
//! ```

pub mod element;
pub mod error;
pub mod events;
pub mod fsm;
pub mod geometry;

pub use element::{AssetRef, ElementId};
pub use error::{AnimationError, Result};
pub use events::{EventType, HostEvent};
pub use fsm::{EventId, StateId, StateMachine, Transition};
pub use geometry::{Point, Rect, Size};
