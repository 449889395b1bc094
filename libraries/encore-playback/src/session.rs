//! Playback session - core orchestration
//!
//! One session owns one queue for one destination and is the only code path
//! that mutates it. Sequencing is driven by dispatcher completion signals:
//! every playing track gets a one-shot watcher that advances the queue when
//! the track ends, no matter whether it finished naturally or was skipped.

use crate::error::{Result, SessionError};
use crate::events::{EventReceiver, EventSender, SessionEvent};
use crate::queue::{Admission, TrackQueue};
use crate::registry::SessionRegistry;
use crate::sink::{Dispatcher, PlaybackSink, VoiceDestination};
use crate::track::Track;
use crate::types::{EndReason, PlayOptions, SessionConfig};
use crate::volume::{gain_from_percent, percent_from_gain, FadePlan, FadeStep};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One active playback queue bound to one destination
///
/// All mutating operations are safe no-ops once the session is stopped or
/// destroyed; teardown is idempotent because lifecycle signals (skip, natural
/// completion, stop) can race each other.
pub struct Session {
    id: String,
    config: SessionConfig,
    events: EventSender,
    registry: Weak<SessionRegistry>,
    handle: Weak<Session>,
    state: Mutex<SessionState>,
}

struct SessionState {
    queue: TrackQueue,
    sink: Option<Arc<dyn PlaybackSink>>,
    current: Option<CurrentTrack>,
    gain: f64,
    started: bool,
    paused: bool,
    stopped: bool,
    destroyed: bool,
    fade_task: Option<JoinHandle<()>>,
    // Incremented per fade; a finishing fade task only clears `fade_task`
    // while the counter still matches its own
    fade_seq: u64,
    advance_timer: Option<JoinHandle<()>>,
}

#[derive(Clone)]
struct CurrentTrack {
    track: Track,
    dispatcher: Dispatcher,
}

impl Session {
    /// Create a session not bound to any registry
    pub fn detached(
        id: impl Into<String>,
        config: SessionConfig,
    ) -> (Arc<Self>, EventReceiver) {
        Self::build(id.into(), config, Weak::new())
    }

    pub(crate) fn build(
        id: String,
        config: SessionConfig,
        registry: Weak<SessionRegistry>,
    ) -> (Arc<Self>, EventReceiver) {
        let (events, receiver) = mpsc::unbounded_channel();
        let gain = gain_from_percent(config.default_volume);
        let item_limit = config.item_limit;

        let session = Arc::new_cyclic(|handle| Self {
            id,
            config,
            events,
            registry,
            handle: handle.clone(),
            state: Mutex::new(SessionState {
                queue: TrackQueue::new(item_limit),
                sink: None,
                current: None,
                gain,
                started: false,
                paused: false,
                stopped: false,
                destroyed: false,
                fade_task: None,
                fade_seq: 0,
                advance_timer: None,
            }),
        });

        (session, receiver)
    }

    /// Destination identity this session is bound to
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Externally visible volume percentage
    pub fn volume(&self) -> u8 {
        percent_from_gain(self.state.lock().unwrap().gain)
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().unwrap().started
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().unwrap().stopped
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().unwrap().destroyed
    }

    pub fn queue_len(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    /// Queued tracks in play order, for display
    pub fn queue_snapshot(&self) -> Vec<Track> {
        self.state.lock().unwrap().queue.iter().cloned().collect()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.state
            .lock()
            .unwrap()
            .current
            .as_ref()
            .map(|current| current.track.clone())
    }

    /// Acquire the playback destination
    ///
    /// Refusal propagates as [`SessionError::Connection`]; the session never
    /// retries on its own.
    pub async fn connect(&self, destination: &dyn VoiceDestination) -> Result<()> {
        let sink = destination.connect().await?;
        let mut state = self.state.lock().unwrap();
        if state.stopped {
            return Ok(());
        }
        state.sink = Some(sink);
        debug!(session = %self.id, "destination connected");
        Ok(())
    }

    /// Enqueue a batch of candidate tracks
    ///
    /// Partial-success contract: tracks overflowing the item limit are
    /// rejected from the tail of the incoming batch and reported alongside
    /// the accepted prefix. After stop this accepts nothing.
    pub fn add(&self, tracks: Vec<Track>) -> Admission {
        let mut state = self.state.lock().unwrap();
        if state.stopped {
            return Admission::default();
        }

        let admission = state.queue.admit(tracks);
        debug!(
            session = %self.id,
            accepted = admission.accepted.len(),
            rejected = admission.rejected.len(),
            queued = state.queue.len(),
            "tracks enqueued"
        );
        admission
    }

    /// Shuffle the queued tracks
    ///
    /// The current track is unaffected. No-op after stop.
    pub fn shuffle(&self) {
        let mut state = self.state.lock().unwrap();
        if state.stopped {
            return;
        }
        state.queue.shuffle();
        debug!(session = %self.id, queued = state.queue.len(), "queue shuffled");
    }

    /// Begin playback of the queue head
    ///
    /// Valid once per session, before any track became current.
    pub fn play(&self) -> Result<()> {
        {
            let mut state = self.state.lock().unwrap();
            if state.stopped {
                return Ok(());
            }
            if state.sink.is_none() {
                return Err(SessionError::NotConnected);
            }
            if state.started {
                return Err(SessionError::AlreadyStarted);
            }
            state.started = true;
        }
        self.schedule_advance(Duration::ZERO);
        Ok(())
    }

    /// Skip the current track
    ///
    /// The dispatcher is forced to end with a skip reason; the completion
    /// watcher then advances exactly once even if a natural completion
    /// arrives for the same dispatcher afterwards.
    pub fn skip(&self) -> Result<()> {
        let current = {
            let state = self.state.lock().unwrap();
            if state.stopped {
                return Ok(());
            }
            state.current.clone().ok_or(SessionError::NoCurrentTrack)?
        };

        current.dispatcher.end(EndReason::Skipped);
        self.emit(SessionEvent::Skipped(current.track));
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        {
            let mut state = self.state.lock().unwrap();
            if state.stopped {
                return Ok(());
            }
            let current = state.current.as_ref().ok_or(SessionError::NoCurrentTrack)?;
            current.dispatcher.pause();
            state.paused = true;
        }
        self.emit(SessionEvent::Paused);
        Ok(())
    }

    pub fn resume(&self) -> Result<()> {
        {
            let mut state = self.state.lock().unwrap();
            if state.stopped {
                return Ok(());
            }
            let current = state.current.as_ref().ok_or(SessionError::NoCurrentTrack)?;
            current.dispatcher.resume();
            state.paused = false;
        }
        self.emit(SessionEvent::Resumed);
        Ok(())
    }

    /// Apply a volume percentage immediately
    ///
    /// The session does not clamp against `max_volume`; callers bound
    /// user-supplied values first.
    pub fn set_volume(&self, percent: u8) -> Result<()> {
        {
            let mut state = self.state.lock().unwrap();
            if state.stopped {
                return Ok(());
            }
            let current = state.current.as_ref().ok_or(SessionError::NoCurrentTrack)?;
            let gain = gain_from_percent(percent);
            current.dispatcher.set_volume(gain);
            state.gain = gain;
        }
        self.emit(SessionEvent::VolumeChanged(percent));
        Ok(())
    }

    /// Fade the volume to a target percentage
    ///
    /// Steps linearly on a fixed tick toward the target, snaps exactly onto
    /// it, then waits a short settle delay before emitting the final
    /// volume-changed event. At most one fade is in flight per session:
    /// starting a new fade cancels the previous fade's timer first, so the
    /// second call's target always wins.
    pub fn fade_volume(&self, percent: u8) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.stopped {
            return Ok(());
        }
        let current = state.current.as_ref().ok_or(SessionError::NoCurrentTrack)?;
        let dispatcher = current.dispatcher.clone();

        if let Some(previous) = state.fade_task.take() {
            previous.abort();
        }

        let target = gain_from_percent(percent);
        let mut plan = FadePlan::new(state.gain, target, self.config.fade_step);
        state.gain = target;
        state.fade_seq += 1;
        let seq = state.fade_seq;

        let Some(session) = self.handle.upgrade() else {
            return Ok(());
        };
        let tick = self.config.fade_tick;
        let settle = self.config.fade_settle;

        state.fade_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            loop {
                ticker.tick().await;
                match plan.advance() {
                    FadeStep::Intermediate(gain) => dispatcher.set_volume(gain),
                    FadeStep::Settled(gain) => {
                        dispatcher.set_volume(gain);
                        break;
                    }
                }
            }

            tokio::time::sleep(settle).await;
            let stopped = {
                let mut state = session.state.lock().unwrap();
                // A newer fade owns the slot once the counter moved on
                if state.fade_seq == seq {
                    state.fade_task = None;
                }
                state.stopped
            };
            if !stopped {
                session.emit(SessionEvent::VolumeChanged(percent));
            }
        }));

        Ok(())
    }

    /// Stop playback and tear the session down
    ///
    /// Clears the queue, cancels any in-flight fade and pending advance
    /// timer, ends the dispatcher with a stop reason and destroys the
    /// session. Idempotent.
    pub fn stop(&self) {
        let dispatcher = {
            let mut state = self.state.lock().unwrap();
            if state.stopped {
                return;
            }
            state.stopped = true;
            state.queue.clear();
            if let Some(fade) = state.fade_task.take() {
                fade.abort();
            }
            if let Some(timer) = state.advance_timer.take() {
                timer.abort();
            }
            state.current.take().map(|current| current.dispatcher)
        };

        if let Some(dispatcher) = dispatcher {
            dispatcher.end(EndReason::Stopped);
        }
        info!(session = %self.id, "session stopped");
        self.destroy();
    }

    /// Release the destination binding and deregister
    ///
    /// Safe to call when already destroyed: the second call is a no-op.
    pub fn destroy(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.stopped = true;
            state.sink = None;
            if let Some(fade) = state.fade_task.take() {
                fade.abort();
            }
            if let Some(timer) = state.advance_timer.take() {
                timer.abort();
            }
        }

        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.id);
        }
        info!(session = %self.id, "session destroyed");
        self.emit(SessionEvent::Destroyed);
    }

    /// Move to the next playable queued track
    ///
    /// Iterative on purpose: a run of unavailable tracks is retried by
    /// looping, bounded by queue length, so it cannot grow the call stack.
    async fn advance(self: Arc<Self>) {
        loop {
            let (track, sink, gain) = {
                let mut state = self.state.lock().unwrap();
                if state.stopped {
                    return;
                }
                let Some(track) = state.queue.pop_next() else {
                    drop(state);
                    info!(session = %self.id, "queue exhausted");
                    self.emit(SessionEvent::Exhausted);
                    self.destroy();
                    return;
                };
                let Some(sink) = state.sink.clone() else {
                    return;
                };
                // Seed volume from the track's override or the session default
                state.gain = track.volume_override().map_or_else(
                    || gain_from_percent(self.config.default_volume),
                    gain_from_percent,
                );
                (track, sink, state.gain)
            };

            let Some(dispatcher) = track.begin(&sink, PlayOptions { gain }).await else {
                warn!(session = %self.id, track = %track, "stream unavailable, advancing");
                self.emit(SessionEvent::Unavailable(track));
                continue;
            };

            let ended = dispatcher.ended();
            {
                let mut state = self.state.lock().unwrap();
                if state.stopped {
                    // Stop raced the start; shut the stream down again
                    dispatcher.end(EndReason::Stopped);
                    return;
                }
                state.current = Some(CurrentTrack {
                    track: track.clone(),
                    dispatcher,
                });
                state.paused = false;
            }

            debug!(session = %self.id, track = %track, "track playing");
            self.emit(SessionEvent::Playing(track.clone()));
            self.watch_completion(track, ended);
            return;
        }
    }

    /// One-shot completion watcher for the current dispatcher
    ///
    /// First-reason-wins on the dispatcher side plus a single resolution here
    /// guarantee one advance per dispatcher, whichever of skip and natural
    /// completion lands first.
    fn watch_completion(&self, track: Track, mut ended: watch::Receiver<Option<EndReason>>) {
        let Some(session) = self.handle.upgrade() else {
            return;
        };

        tokio::spawn(async move {
            let reason = loop {
                if let Some(reason) = *ended.borrow_and_update() {
                    break reason;
                }
                if ended.changed().await.is_err() {
                    return;
                }
            };

            {
                let mut state = session.state.lock().unwrap();
                state.current = None;
                if state.stopped {
                    return;
                }
            }

            match reason {
                EndReason::Stopped => return,
                EndReason::Finished => {
                    debug!(session = %session.id, track = %track, "track ended");
                    session.emit(SessionEvent::Ended(track));
                }
                EndReason::Skipped => {}
            }

            // Short grace absorbs sink teardown latency between two tracks
            session.schedule_advance(session.config.advance_grace);
        });
    }

    fn schedule_advance(&self, delay: Duration) {
        let Some(session) = self.handle.upgrade() else {
            return;
        };

        let task = tokio::spawn(async move {
            if delay > Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
            session.advance().await;
        });
        self.state.lock().unwrap().advance_timer = Some(task);
    }

    fn emit(&self, event: SessionEvent) {
        // Receiver may be gone during teardown; delivery is best effort
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("queued", &state.queue.len())
            .field("started", &state.started)
            .field("paused", &state.paused)
            .field("stopped", &state.stopped)
            .field("destroyed", &state.destroyed)
            .finish_non_exhaustive()
    }
}
