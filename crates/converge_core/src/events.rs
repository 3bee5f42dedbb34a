//! Host lifecycle events
//!
//! The host shell forwards these to the stage; everything else about the
//! host (window, DOM, scene graph) stays on its side of the boundary.

use crate::geometry::Size;

/// Event type identifier
pub type EventType = u32;

/// Lifecycle event types
pub mod event_types {
    use super::EventType;

    pub const MOUNT: EventType = 60;
    pub const UNMOUNT: EventType = 61;
    pub const RESIZE: EventType = 40;
}

/// A lifecycle notification from the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// The render tree is attached and can be queried
    Mount,
    /// The render tree is going away; no further writes may happen
    Unmount,
    /// The container changed size. The payload is informational: the stage
    /// always re-reads bounds from the render target.
    Resize(Size),
}

impl HostEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            HostEvent::Mount => event_types::MOUNT,
            HostEvent::Unmount => event_types::UNMOUNT,
            HostEvent::Resize(_) => event_types::RESIZE,
        }
    }
}
