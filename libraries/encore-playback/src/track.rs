//! Track abstraction
//!
//! A [`Track`] is one playable unit: metadata fixed at construction plus a
//! lazy, cached stream acquisition. Clones share the stream cache, so a
//! track handed to the session and a copy kept for display stay consistent.

use crate::provider::SourceProvider;
use crate::sink::{Dispatcher, MediaStream, PlaybackSink};
use crate::types::{PlayOptions, Requester};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Track length, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackDuration {
    /// Finite length; playback completes naturally
    Finite(Duration),

    /// Unbounded live stream; never completes naturally
    Live,
}

impl TrackDuration {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for TrackDuration {
    /// Renders `live` for live streams, otherwise a clock-style string
    /// (`00:42`, `03:25`, `1:03:25`)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::Finite(duration) => {
                let total = duration.as_secs();
                let hours = total / 3600;
                let minutes = (total % 3600) / 60;
                let seconds = total % 60;
                if hours > 0 {
                    write!(f, "{hours}:{minutes:02}:{seconds:02}")
                } else {
                    write!(f, "{minutes:02}:{seconds:02}")
                }
            }
        }
    }
}

/// Immutable track metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Opaque source-specific identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Thumbnail image reference, if the source has one
    pub thumbnail: Option<String>,

    /// Canonical URL
    pub url: String,

    /// Track length or the live sentinel
    pub duration: TrackDuration,
}

/// One playable unit in a session queue
#[derive(Clone)]
pub struct Track {
    info: TrackInfo,
    requester: Requester,
    volume: Option<u8>,
    provider: Option<Arc<dyn SourceProvider>>,
    stream: Arc<Mutex<Option<MediaStream>>>,
}

impl Track {
    pub fn new(info: TrackInfo, requester: Requester) -> Self {
        Self {
            info,
            requester,
            volume: None,
            provider: None,
            stream: Arc::new(Mutex::new(None)),
        }
    }

    /// Attach the provider that produces this track's stream on demand
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn SourceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Seed the stream cache with an already-produced stream
    #[must_use]
    pub fn with_stream(self, stream: MediaStream) -> Self {
        *self.stream.lock().unwrap() = Some(stream);
        self
    }

    /// Set the per-track volume override percentage
    ///
    /// Used to seed the session volume when this track becomes current.
    #[must_use]
    pub fn with_volume(mut self, percent: u8) -> Self {
        self.volume = Some(percent);
        self
    }

    pub fn info(&self) -> &TrackInfo {
        &self.info
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn title(&self) -> &str {
        &self.info.title
    }

    pub fn url(&self) -> &str {
        &self.info.url
    }

    pub fn duration(&self) -> TrackDuration {
        self.info.duration
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    pub fn volume_override(&self) -> Option<u8> {
        self.volume
    }

    /// Markdown-style link to the track
    pub fn link(&self) -> String {
        format!("[{}]({})", self.info.title, self.info.url)
    }

    /// Link plus rendered duration, for queue listings
    pub fn formatted_title(&self) -> String {
        format!("{} ({})", self.link(), self.info.duration)
    }

    /// Produce the playable stream for this track
    ///
    /// Takes the cached stream if one was seeded, otherwise asks the
    /// provider. At most one stream is produced per play attempt; `None`
    /// means the track is temporarily unavailable.
    pub async fn fetch_stream(&self) -> Option<MediaStream> {
        let cached = self.stream.lock().unwrap().take();
        if cached.is_some() {
            return cached;
        }
        match &self.provider {
            Some(provider) => provider.fetch_stream(&self.info).await,
            None => None,
        }
    }

    /// Fetch the stream and start it on the sink
    ///
    /// Returns `None` when no stream could be produced.
    pub(crate) async fn begin(
        &self,
        sink: &Arc<dyn PlaybackSink>,
        options: PlayOptions,
    ) -> Option<Dispatcher> {
        let stream = self.fetch_stream().await?;
        Some(sink.play(stream, options).await)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.info.title)
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("info", &self.info)
            .field("requester", &self.requester)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(duration: TrackDuration) -> TrackInfo {
        TrackInfo {
            id: "abc123".to_string(),
            title: "Test Song".to_string(),
            thumbnail: None,
            url: "https://example.com/watch?v=abc123".to_string(),
            duration,
        }
    }

    #[test]
    fn duration_renders_clock_style() {
        let finite = |secs| TrackDuration::Finite(Duration::from_secs(secs));

        assert_eq!(finite(42).to_string(), "00:42");
        assert_eq!(finite(205).to_string(), "03:25");
        assert_eq!(finite(3805).to_string(), "1:03:25");
        assert_eq!(TrackDuration::Live.to_string(), "live");
    }

    #[test]
    fn formatted_title_includes_link_and_duration() {
        let track = Track::new(
            info(TrackDuration::Finite(Duration::from_secs(205))),
            Requester::new("1", "tester"),
        );

        assert_eq!(
            track.formatted_title(),
            "[Test Song](https://example.com/watch?v=abc123) (03:25)"
        );
        assert_eq!(track.to_string(), "Test Song");
    }

    #[tokio::test]
    async fn seeded_stream_is_taken_once() {
        let track = Track::new(info(TrackDuration::Live), Requester::new("1", "tester"))
            .with_stream(MediaStream::new(tokio::io::empty()));

        assert!(track.fetch_stream().await.is_some());
        // No provider to re-produce it: a second attempt is unavailable
        assert!(track.fetch_stream().await.is_none());
    }

    #[tokio::test]
    async fn clones_share_the_stream_cache() {
        let track = Track::new(info(TrackDuration::Live), Requester::new("1", "tester"))
            .with_stream(MediaStream::new(tokio::io::empty()));
        let copy = track.clone();

        assert!(copy.fetch_stream().await.is_some());
        assert!(track.fetch_stream().await.is_none());
    }

    #[test]
    fn volume_override_is_optional() {
        let track = Track::new(info(TrackDuration::Live), Requester::new("1", "tester"));
        assert_eq!(track.volume_override(), None);

        let track = track.with_volume(80);
        assert_eq!(track.volume_override(), Some(80));
    }
}
