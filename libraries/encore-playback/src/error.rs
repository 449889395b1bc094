//! Error types for playback sessions

use thiserror::Error;

/// Session errors
///
/// Recoverable per-track failures (a stream that cannot be produced) are not
/// errors: the session absorbs them, emits [`SessionEvent::Unavailable`] and
/// advances to the next queued track. Capacity overflow is reported as
/// structured [`Admission`] data, never as an error.
///
/// [`SessionEvent::Unavailable`]: crate::SessionEvent::Unavailable
/// [`Admission`]: crate::Admission
#[derive(Debug, Error)]
pub enum SessionError {
    /// The destination refused the connection
    #[error("destination connection refused: {0}")]
    Connection(String),

    /// Operation requires a connected destination
    #[error("session is not connected to a destination")]
    NotConnected,

    /// `play` was called after playback already started
    #[error("playback already started")]
    AlreadyStarted,

    /// Operation requires a current track
    #[error("no track is currently playing")]
    NoCurrentTrack,

    /// The destination already has an active session
    #[error("destination already has an active session")]
    DestinationTaken,
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
