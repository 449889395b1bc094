//! FIFO track queue with capacity admission
//!
//! The queue is owned and mutated exclusively by its session. Capacity is
//! enforced at enqueue time: a batch that would overflow the limit has its
//! newest tracks rejected, never the existing queue's.

use crate::track::Track;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::VecDeque;
use std::fmt;

/// Why a track was rejected at enqueue time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The queue's item limit was reached
    CapacityExceeded {
        /// The configured limit
        limit: usize,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { limit } => {
                write!(f, "queue item limit reached (max. {limit} items)")
            }
        }
    }
}

/// A track that did not make it into the queue
#[derive(Debug, Clone)]
pub struct RejectedTrack {
    pub track: Track,
    pub reason: RejectReason,
}

/// Outcome of one `add` call: partial success, never all-or-nothing
#[derive(Debug, Clone, Default)]
pub struct Admission {
    /// Tracks appended to the queue, in their incoming order
    pub accepted: Vec<Track>,

    /// Tracks rejected from the tail of the incoming batch
    pub rejected: Vec<RejectedTrack>,
}

/// FIFO queue bounded by an item limit
#[derive(Debug)]
pub struct TrackQueue {
    items: VecDeque<Track>,
    limit: usize,
}

impl TrackQueue {
    pub fn new(limit: usize) -> Self {
        Self {
            items: VecDeque::new(),
            limit,
        }
    }

    /// Admit a batch of candidate tracks
    ///
    /// Computes `overflow = len + batch.len() - limit`; when positive, the
    /// newest `overflow` tracks (the tail of the incoming batch) are rejected
    /// with a capacity reason and the remaining prefix is appended in order.
    pub fn admit(&mut self, mut batch: Vec<Track>) -> Admission {
        let overflow = (self.items.len() + batch.len()).saturating_sub(self.limit);

        let rejected = if overflow > 0 {
            let keep = batch.len().saturating_sub(overflow);
            batch
                .split_off(keep)
                .into_iter()
                .map(|track| RejectedTrack {
                    track,
                    reason: RejectReason::CapacityExceeded { limit: self.limit },
                })
                .collect()
        } else {
            Vec::new()
        };

        self.items.extend(batch.iter().cloned());

        Admission {
            accepted: batch,
            rejected,
        }
    }

    /// Dequeue the head track
    pub fn pop_next(&mut self) -> Option<Track> {
        self.items.pop_front()
    }

    /// Shuffle the queued tracks in place (Fisher-Yates)
    pub fn shuffle(&mut self) {
        self.items.make_contiguous().shuffle(&mut thread_rng());
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Queued tracks in play order, for display
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.items.iter()
    }
}
