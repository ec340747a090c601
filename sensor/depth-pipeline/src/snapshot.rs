//! Latest-wins hand-off of point clouds between threads.

use std::mem;

use depth_types::{PointCloudSnapshot, Timestamp};
use glam::Vec3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Counters describing snapshot traffic through a [`SnapshotStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Snapshots published by the producer.
    pub published: u64,
    /// Snapshots taken by the consumer.
    pub taken: u64,
    /// Snapshots overwritten before the consumer took them.
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Slot {
    points: Vec<Vec3>,
    timestamp: Timestamp,
    updated: bool,
    stats: StoreStats,
}

/// Single-slot store shared by the capture thread and the consumer.
///
/// The producer always overwrites; the consumer takes the newest snapshot at
/// most once. The lock is held only for the swap, so neither side waits on
/// unprojection or on consumer work.
///
/// # Example
///
/// ```
/// use depth_pipeline::SnapshotStore;
/// use depth_types::Timestamp;
/// use glam::Vec3;
///
/// let store = SnapshotStore::new();
/// store.publish(vec![Vec3::Z], Timestamp::from_ticks(1));
/// store.publish(vec![Vec3::X, Vec3::Y], Timestamp::from_ticks(2));
///
/// let snapshot = store.take_if_updated().unwrap();
/// assert_eq!(snapshot.timestamp, Timestamp::from_ticks(2));
/// assert_eq!(snapshot.len(), 2);
/// assert!(store.take_if_updated().is_none());
/// ```
#[derive(Debug, Default)]
pub struct SnapshotStore {
    slot: Mutex<Slot>,
}

impl SnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a new snapshot, replacing any unconsumed one.
    pub fn publish(&self, points: Vec<Vec3>, timestamp: Timestamp) {
        let superseded = {
            let mut slot = self.slot.lock();
            if slot.updated {
                slot.stats.dropped += 1;
            }
            slot.stats.published += 1;
            slot.timestamp = timestamp;
            slot.updated = true;
            mem::replace(&mut slot.points, points)
        };
        drop(superseded);
    }

    /// Takes the newest snapshot if one was published since the last take.
    ///
    /// Returns `None` and leaves the store untouched otherwise.
    #[must_use]
    pub fn take_if_updated(&self) -> Option<PointCloudSnapshot> {
        let mut slot = self.slot.lock();
        if !slot.updated {
            return None;
        }
        slot.updated = false;
        slot.stats.taken += 1;
        let points = mem::take(&mut slot.points);
        Some(PointCloudSnapshot::new(points, slot.timestamp))
    }

    /// Returns true if an unconsumed snapshot is waiting.
    #[must_use]
    pub fn has_update(&self) -> bool {
        self.slot.lock().updated
    }

    /// Discards any unconsumed snapshot.
    pub fn clear(&self) {
        let discarded = {
            let mut slot = self.slot.lock();
            slot.updated = false;
            mem::take(&mut slot.points)
        };
        drop(discarded);
    }

    /// Returns the traffic counters.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        self.slot.lock().stats
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn ts(ticks: u64) -> Timestamp {
        Timestamp::from_ticks(ticks)
    }

    #[test]
    fn empty_store_yields_nothing() {
        let store = SnapshotStore::new();
        assert!(!store.has_update());
        assert!(store.take_if_updated().is_none());
        assert_eq!(store.stats(), StoreStats::default());
    }

    #[test]
    fn take_returns_once() {
        let store = SnapshotStore::new();
        store.publish(vec![Vec3::ONE], ts(5));
        assert!(store.has_update());

        let snapshot = store.take_if_updated().unwrap();
        assert_eq!(snapshot.points, vec![Vec3::ONE]);
        assert_eq!(snapshot.timestamp, ts(5));
        assert!(store.take_if_updated().is_none());
    }

    #[test]
    fn latest_wins() {
        let store = SnapshotStore::new();
        store.publish(vec![Vec3::X], ts(1));
        store.publish(vec![Vec3::Y], ts(2));
        store.publish(vec![Vec3::Z], ts(3));

        let snapshot = store.take_if_updated().unwrap();
        assert_eq!(snapshot.timestamp, ts(3));
        assert_eq!(snapshot.points, vec![Vec3::Z]);

        let stats = store.stats();
        assert_eq!(stats.published, 3);
        assert_eq!(stats.taken, 1);
        assert_eq!(stats.dropped, 2);
    }

    #[test]
    fn empty_cloud_is_still_an_update() {
        let store = SnapshotStore::new();
        store.publish(Vec::new(), ts(9));
        let snapshot = store.take_if_updated().unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.timestamp, ts(9));
    }

    #[test]
    fn clear_discards_pending() {
        let store = SnapshotStore::new();
        store.publish(vec![Vec3::X], ts(1));
        store.clear();
        assert!(store.take_if_updated().is_none());
    }

    #[test]
    fn concurrent_publish_and_take() {
        let store = Arc::new(SnapshotStore::new());
        let producer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 1..=500u64 {
                    store.publish(vec![Vec3::splat(1.0); 8], ts(i));
                }
            })
        };

        let mut last = ts(0);
        let mut taken = 0u64;
        while !producer.is_finished() || store.has_update() {
            if let Some(snapshot) = store.take_if_updated() {
                assert!(snapshot.timestamp > last);
                assert_eq!(snapshot.len(), 8);
                last = snapshot.timestamp;
                taken += 1;
            }
        }
        producer.join().unwrap();

        let stats = store.stats();
        assert_eq!(stats.published, 500);
        assert_eq!(stats.taken, taken);
        assert_eq!(stats.taken + stats.dropped, 500);
    }
}
