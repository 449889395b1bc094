//! Encore - Playback Session Management
//!
//! Per-channel audio playback queue management for chat bots.
//!
//! This crate provides:
//! - Playback sessions (FIFO queue, sequencing, lifecycle/teardown)
//! - Capacity admission (partial-success enqueue against an item limit)
//! - Volume control on an internal gain scale with linear fades
//! - A track abstraction (metadata + lazy, cached stream acquisition)
//! - Source provider and playback sink contracts
//! - A destination-to-session registry
//!
//! # Architecture
//!
//! `encore-playback` is platform-agnostic: it knows nothing about any chat
//! platform, voice transport, or codec. The embedding bot supplies those
//! behind traits ([`SourceProvider`], [`PlaybackSink`], [`VoiceDestination`])
//! and consumes [`SessionEvent`]s for presentation.
//!
//! All session state is owned by the session itself and mutated only through
//! its methods; sequencing runs on dispatcher completion signals, and timers
//! (fade ticks, the inter-track grace delay) are cancelled on stop so nothing
//! fires after teardown.
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_playback::{
//!     Requester, SessionConfig, SessionRegistry, Track, TrackDuration, TrackInfo,
//! };
//! use std::time::Duration;
//!
//! # async fn example(destination: &dyn encore_playback::VoiceDestination)
//! # -> encore_playback::Result<()> {
//! let registry = SessionRegistry::new(SessionConfig::default());
//! let (session, mut events) = registry.open("guild-1")?;
//!
//! session.connect(destination).await?;
//!
//! let track = Track::new(
//!     TrackInfo {
//!         id: "abc123".to_string(),
//!         title: "My Song".to_string(),
//!         thumbnail: None,
//!         url: "https://example.com/watch?v=abc123".to_string(),
//!         duration: TrackDuration::Finite(Duration::from_secs(205)),
//!     },
//!     Requester::new("42", "dj"),
//! );
//!
//! let admission = session.add(vec![track]);
//! assert!(admission.rejected.is_empty());
//! session.play()?;
//!
//! while let Some(event) = events.recv().await {
//!     // Forward to presentation
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod events;
mod provider;
mod queue;
mod registry;
mod session;
mod sink;
mod track;
pub mod types;
mod volume;

// Public exports
pub use error::{Result, SessionError};
pub use events::{EventReceiver, EventSender, SessionEvent};
pub use provider::{select_provider, SourceProvider, TrackRequest};
pub use queue::{Admission, RejectReason, RejectedTrack, TrackQueue};
pub use registry::SessionRegistry;
pub use session::Session;
pub use sink::{
    Dispatcher, DispatcherBackend, MediaStream, PlaybackSink, SinkCommand, VoiceDestination,
};
pub use track::{Track, TrackDuration, TrackInfo};
pub use types::{EndReason, PlayOptions, Requester, SessionConfig};
pub use volume::{gain_from_percent, percent_from_gain, FadePlan, FadeStep};
