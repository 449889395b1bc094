//! Core types for playback sessions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The user who queued a track
///
/// Set when the track is created and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    /// Platform-specific user identifier
    pub id: String,

    /// Display name
    pub name: String,
}

impl Requester {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Why a dispatcher ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The track played to its natural end
    Finished,

    /// A skip was requested
    Skipped,

    /// The session was stopped
    Stopped,
}

/// Parameters handed to the sink when starting a stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    /// Initial gain on the internal scale (0.0-2.0 for 0-100%)
    pub gain: f64,
}

/// Configuration for a playback session
///
/// Supplied by the embedding bot's settings store at session construction.
/// The timing fields are tunables, not semantic contracts: `advance_grace`
/// only absorbs sink teardown latency between two tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Default volume percentage for new tracks (default: 50)
    pub default_volume: u8,

    /// Maximum volume percentage callers should allow (default: 100)
    ///
    /// The session itself never clamps against this; callers bound
    /// user-supplied values before `set_volume`/`fade_volume`.
    pub max_volume: u8,

    /// Maximum queue length, enforced at enqueue time (default: 200)
    pub item_limit: usize,

    /// Delay between one track ending and the next starting (default: 10ms)
    pub advance_grace: Duration,

    /// Interval between volume fade steps (default: 35ms)
    pub fade_tick: Duration,

    /// Gain change per fade step on the internal scale (default: 0.05)
    pub fade_step: f64,

    /// Settle delay after a fade reaches its target, before the final
    /// volume-changed event (default: 800ms)
    pub fade_settle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_volume: 50,
            max_volume: 100,
            item_limit: 200,
            advance_grace: Duration::from_millis(10),
            fade_tick: Duration::from_millis(35),
            fade_step: 0.05,
            fade_settle: Duration::from_millis(800),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.default_volume, 50);
        assert_eq!(config.max_volume, 100);
        assert_eq!(config.item_limit, 200);
        assert_eq!(config.fade_tick, Duration::from_millis(35));
        assert!((config.fade_step - 0.05).abs() < f64::EPSILON);
    }
}
