//! Defines the events broadcast by the dialclock engine.
//!
//! Subscribers receive these through
//! [`DialclockEngine::subscribe_events`](crate::engine::DialclockEngine::subscribe_events).
//! Nothing in the engine depends on anyone listening.

use crate::common::{ClockId, ElementId};
use crate::time::WallTime;

/// Lifecycle and refresh events of the clock faces an engine drives.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockEvent {
    /// Fired when a face is built and tracked.
    Created { id: ClockId, element: ElementId },
    /// Fired after a face has been redrawn for `time`.
    Rendered { id: ClockId, time: WallTime },
    /// Fired when a stopped face is started again.
    Started { id: ClockId },
    /// Fired when a face is stopped.
    Stopped { id: ClockId },
}
