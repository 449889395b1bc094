//! Playback sink and dispatcher contracts
//!
//! The sink is the live audio output channel for one destination. Starting a
//! stream on it yields a [`Dispatcher`]: the session-side handle for
//! transport commands plus a one-shot completion signal. The sink side holds
//! the matching [`DispatcherBackend`].

use crate::error::Result;
use crate::types::{EndReason, PlayOptions};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, watch};

/// Opaque playable stream handle
///
/// Produced per track by a source provider and consumed by the sink. Codec
/// and transcoding details are the sink's concern.
pub struct MediaStream {
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl MediaStream {
    pub fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Consume the handle, yielding the underlying byte reader
    pub fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        self.reader
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream").finish_non_exhaustive()
    }
}

/// Transport commands sent from the dispatcher to the sink backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SinkCommand {
    Pause,
    Resume,
    /// Apply a new gain on the internal scale
    SetVolume(f64),
}

/// Session-side handle for one playing stream
///
/// Cheap to clone; all clones address the same stream. The completion signal
/// is first-reason-wins: once an end reason is recorded, later `end` calls
/// and the backend's natural-finish signal are ignored. That gives observers
/// exactly one completion per dispatcher, which is what lets a skip race a
/// natural finish without a double advance.
#[derive(Clone)]
pub struct Dispatcher {
    commands: mpsc::UnboundedSender<SinkCommand>,
    ended: Arc<watch::Sender<Option<EndReason>>>,
}

impl Dispatcher {
    /// Create a connected dispatcher/backend pair
    ///
    /// Called by sink implementations inside [`PlaybackSink::play`].
    pub fn channel() -> (Self, DispatcherBackend) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (ended, _) = watch::channel(None);
        let ended = Arc::new(ended);

        (
            Self {
                commands,
                ended: Arc::clone(&ended),
            },
            DispatcherBackend {
                commands: command_rx,
                ended,
            },
        )
    }

    pub fn pause(&self) {
        let _ = self.commands.send(SinkCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.commands.send(SinkCommand::Resume);
    }

    /// Apply a gain on the internal scale (0.0-2.0)
    pub fn set_volume(&self, gain: f64) {
        let _ = self.commands.send(SinkCommand::SetVolume(gain));
    }

    /// Force the stream to end with the given reason
    ///
    /// Only the first recorded reason wins.
    pub fn end(&self, reason: EndReason) {
        self.ended.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(reason);
                true
            } else {
                false
            }
        });
    }

    /// Subscribe to the completion signal
    ///
    /// Resolves to `Some(reason)` exactly once per dispatcher.
    pub fn ended(&self) -> watch::Receiver<Option<EndReason>> {
        self.ended.subscribe()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("ended", &*self.ended.borrow())
            .finish_non_exhaustive()
    }
}

/// Sink-side half of a dispatcher pair
pub struct DispatcherBackend {
    commands: mpsc::UnboundedReceiver<SinkCommand>,
    ended: Arc<watch::Sender<Option<EndReason>>>,
}

impl DispatcherBackend {
    /// Receive the next transport command
    ///
    /// Returns `None` once every [`Dispatcher`] clone has been dropped.
    pub async fn next_command(&mut self) -> Option<SinkCommand> {
        self.commands.recv().await
    }

    /// Signal that the stream played to its natural end
    ///
    /// Ignored if an end reason (skip, stop) was already recorded.
    pub fn finish(&self) {
        self.ended.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(EndReason::Finished);
                true
            } else {
                false
            }
        });
    }
}

/// Live audio output channel for one destination
///
/// Implemented by the embedding bot on top of its voice transport.
#[async_trait]
pub trait PlaybackSink: Send + Sync {
    /// Start playing a stream, yielding its dispatcher
    async fn play(&self, stream: MediaStream, options: PlayOptions) -> Dispatcher;
}

/// A joinable playback destination (voice channel, output device, ...)
#[async_trait]
pub trait VoiceDestination: Send + Sync {
    /// Acquire the destination's sink
    ///
    /// Refusal surfaces as [`SessionError::Connection`] and is propagated to
    /// the caller of [`Session::connect`], never retried by the session.
    ///
    /// [`SessionError::Connection`]: crate::SessionError::Connection
    /// [`Session::connect`]: crate::Session::connect
    async fn connect(&self) -> Result<Arc<dyn PlaybackSink>>;
}
