//! Session events
//!
//! The session reports every observable state change over an unbounded
//! channel handed out at construction. Events for one session arrive in the
//! order the underlying state changes occurred; presentation and registry
//! layers consume them without ever touching session internals.

use crate::track::Track;
use tokio::sync::mpsc;

/// Events emitted by a playback session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A track started playing on the sink
    Playing(Track),

    /// The current track played to its natural end
    Ended(Track),

    /// Playback paused
    Paused,

    /// Playback resumed
    Resumed,

    /// Volume changed; carries the new external percentage
    VolumeChanged(u8),

    /// The current track was skipped
    Skipped(Track),

    /// A track's stream could not be produced; the session moved on
    Unavailable(Track),

    /// The queue ran out with nothing left to play
    Exhausted,

    /// The session released its destination and deregistered
    Destroyed,
}

/// Sending half of a session's event channel
pub type EventSender = mpsc::UnboundedSender<SessionEvent>;

/// Receiving half of a session's event channel
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;
