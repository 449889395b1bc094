//! Property-based tests for queue admission and volume math
//!
//! Uses proptest to verify invariants across many random inputs.

use encore_playback::{
    gain_from_percent, percent_from_gain, FadePlan, FadeStep, Requester, Track, TrackDuration,
    TrackInfo, TrackQueue,
};
use proptest::prelude::*;
use std::time::Duration;

// ===== Helpers =====

fn arbitrary_track() -> impl Strategy<Value = Track> {
    ("[a-z0-9]{1,10}", "[A-Za-z ]{1,30}", 1u64..600).prop_map(|(id, title, duration_secs)| {
        Track::new(
            TrackInfo {
                id: id.clone(),
                title,
                thumbnail: None,
                url: format!("https://example.com/{id}"),
                duration: TrackDuration::Finite(Duration::from_secs(duration_secs)),
            },
            Requester::new("1", "tester"),
        )
    })
}

fn arbitrary_batch() -> impl Strategy<Value = Vec<Track>> {
    prop::collection::vec(arbitrary_track(), 0..40)
}

// ===== Property Tests =====

proptest! {
    /// Property: queue length never exceeds the limit, across any
    /// sequence of admitted batches
    #[test]
    fn queue_never_exceeds_its_limit(
        limit in 1usize..30,
        batches in prop::collection::vec(arbitrary_batch(), 1..8)
    ) {
        let mut queue = TrackQueue::new(limit);

        for batch in batches {
            queue.admit(batch);
            prop_assert!(queue.len() <= limit);
        }
    }

    /// Property: admission partitions the batch exactly. Accepted tracks
    /// are the batch's prefix, rejected tracks the excess tail, and the
    /// split point is determined by the free capacity.
    #[test]
    fn admission_partitions_the_batch(
        limit in 1usize..30,
        seed in arbitrary_batch(),
        batch in arbitrary_batch()
    ) {
        let mut queue = TrackQueue::new(limit);
        queue.admit(seed);
        let free = limit - queue.len();

        let incoming: Vec<String> = batch.iter().map(|t| t.id().to_string()).collect();
        let admission = queue.admit(batch);

        let expected_accepted = incoming.len().min(free);
        prop_assert_eq!(admission.accepted.len(), expected_accepted);
        prop_assert_eq!(
            admission.accepted.len() + admission.rejected.len(),
            incoming.len()
        );

        // Prefix accepted, tail rejected, both in incoming order
        for (i, track) in admission.accepted.iter().enumerate() {
            prop_assert_eq!(track.id(), incoming[i].as_str());
        }
        for (i, rejected) in admission.rejected.iter().enumerate() {
            prop_assert_eq!(rejected.track.id(), incoming[expected_accepted + i].as_str());
        }
    }

    /// Property: dequeue order matches admission order
    #[test]
    fn fifo_order_is_stable(batch in arbitrary_batch()) {
        let mut queue = TrackQueue::new(1000);
        let ids: Vec<String> = batch.iter().map(|t| t.id().to_string()).collect();
        queue.admit(batch);

        for id in &ids {
            let track = queue.pop_next().unwrap();
            prop_assert_eq!(track.id(), id.as_str());
        }
        prop_assert!(queue.pop_next().is_none());
    }

    /// Property: shuffle permutes the queue but never adds, drops or
    /// duplicates a track
    #[test]
    fn shuffle_preserves_the_queue_multiset(batch in arbitrary_batch()) {
        let mut queue = TrackQueue::new(1000);
        queue.admit(batch);
        let mut before: Vec<String> = queue.iter().map(|t| t.id().to_string()).collect();

        queue.shuffle();

        let mut after: Vec<String> = queue.iter().map(|t| t.id().to_string()).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    /// Property: percentage to gain mapping is invertible and spans the
    /// documented range
    #[test]
    fn gain_conversion_round_trips(percent in 0u8..=100) {
        let gain = gain_from_percent(percent);
        prop_assert!((0.0..=2.0).contains(&gain));
        prop_assert_eq!(percent_from_gain(gain), percent);
    }

    /// Property: every fade terminates on its exact target in a bounded
    /// number of steps, moving monotonically toward it
    #[test]
    fn fades_terminate_on_target(
        from in 0u8..=100,
        to in 0u8..=100,
        step in 0.01f64..0.5
    ) {
        let current = gain_from_percent(from);
        let target = gain_from_percent(to);
        let mut plan = FadePlan::new(current, target, step);

        let bound = (2.0 / step).ceil() as usize + 2;
        let mut previous = current;
        for _ in 0..bound {
            match plan.advance() {
                FadeStep::Intermediate(gain) => {
                    prop_assert!((gain - target).abs() < (previous - target).abs());
                    previous = gain;
                }
                FadeStep::Settled(gain) => {
                    prop_assert!((gain - target).abs() < 1e-9);
                    return Ok(());
                }
            }
        }
        prop_assert!(false, "fade failed to settle within {} steps", bound);
    }
}
