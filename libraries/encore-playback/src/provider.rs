//! Source provider contract
//!
//! A provider turns a free-text query into playable tracks and produces
//! their streams on demand. Concrete providers (platform search APIs, URL
//! pattern extraction) live in the embedding bot; the session only ever sees
//! the tracks they resolve.

use crate::sink::MediaStream;
use crate::track::{Track, TrackInfo};
use crate::types::Requester;
use async_trait::async_trait;
use std::sync::Arc;

/// Caller-supplied context for one resolution request
#[derive(Debug, Clone)]
pub struct TrackRequest {
    /// Who asked for the track(s)
    pub requester: Requester,

    /// Per-request volume override, carried onto every resolved track
    pub volume: Option<u8>,
}

impl TrackRequest {
    pub fn new(requester: Requester) -> Self {
        Self {
            requester,
            volume: None,
        }
    }

    #[must_use]
    pub fn with_volume(mut self, percent: u8) -> Self {
        self.volume = Some(percent);
        self
    }
}

/// Resolves queries into tracks and tracks into streams
///
/// Implementations must support single-item resolution, playlist expansion
/// into multiple tracks, and a textual-search fallback when the query is not
/// a direct identifier. Every produced track carries the request's requester
/// and volume override.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Whether this provider recognizes the query
    ///
    /// Used by the embedder to pick a provider; sessions never call this.
    fn matches(&self, query: &str) -> bool;

    /// Resolve a query into an ordered sequence of tracks
    ///
    /// `None` (or an empty vec) means nothing resolved.
    async fn resolve(&self, query: &str, request: &TrackRequest) -> Option<Vec<Track>>;

    /// Produce the playable stream for a resolved track
    ///
    /// `None` means temporarily unavailable; the session skips onward.
    async fn fetch_stream(&self, info: &TrackInfo) -> Option<MediaStream>;
}

/// Pick the first provider whose pattern matches the query
pub fn select_provider<'a>(
    providers: &'a [Arc<dyn SourceProvider>],
    query: &str,
) -> Option<&'a Arc<dyn SourceProvider>> {
    providers.iter().find(|provider| provider.matches(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackDuration;

    struct PrefixProvider {
        prefix: &'static str,
    }

    #[async_trait]
    impl SourceProvider for PrefixProvider {
        fn matches(&self, query: &str) -> bool {
            query.starts_with(self.prefix)
        }

        async fn resolve(&self, query: &str, request: &TrackRequest) -> Option<Vec<Track>> {
            let info = TrackInfo {
                id: query.to_string(),
                title: query.to_string(),
                thumbnail: None,
                url: format!("https://{}.example/{query}", self.prefix),
                duration: TrackDuration::Live,
            };
            let mut track = Track::new(info, request.requester.clone());
            if let Some(volume) = request.volume {
                track = track.with_volume(volume);
            }
            Some(vec![track])
        }

        async fn fetch_stream(&self, _info: &TrackInfo) -> Option<MediaStream> {
            Some(MediaStream::new(tokio::io::empty()))
        }
    }

    #[test]
    fn selection_matches_by_pattern() {
        let providers: Vec<Arc<dyn SourceProvider>> = vec![
            Arc::new(PrefixProvider { prefix: "yt" }),
            Arc::new(PrefixProvider { prefix: "sc" }),
        ];

        assert!(select_provider(&providers, "sc:some-song").is_some());
        assert!(select_provider(&providers, "unknown:song").is_none());
    }

    #[tokio::test]
    async fn resolved_tracks_carry_requester_and_volume() {
        let provider = PrefixProvider { prefix: "yt" };
        let request = TrackRequest::new(Requester::new("42", "dj")).with_volume(80);

        let tracks = provider.resolve("yt:song", &request).await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].requester().id, "42");
        assert_eq!(tracks[0].volume_override(), Some(80));
    }
}
