//! Buffered rig pose history.

use depth_types::{Duration, Timestamp};

use crate::buffer::StreamBuffer;
use crate::compose::SpatialTracker;
use crate::transform::Transform3D;

/// Default number of poses kept by [`PoseTrack::default`].
pub const DEFAULT_POSE_CAPACITY: usize = 256;

/// Bounded history of rig-to-world poses.
///
/// Depth frames are stamped slightly in the past relative to the consumer
/// tick, so the pose is looked up by frame timestamp and interpolated
/// between the two nearest recorded poses.
///
/// # Example
///
/// ```
/// use depth_pipeline::{PoseTrack, SpatialTracker, Transform3D};
/// use depth_types::{Duration, Timestamp};
/// use glam::Vec3;
///
/// let mut track = PoseTrack::new(16);
/// track.record(Timestamp::from_ticks(0), Transform3D::identity());
/// track.record(
///     Timestamp::from_ticks(100),
///     Transform3D::from_translation(Vec3::new(1.0, 0.0, 0.0)),
/// );
///
/// let pose = track.locate(Timestamp::from_ticks(25)).unwrap();
/// assert!((pose.translation.x - 0.25).abs() < 1e-6);
/// assert!(track.locate(Timestamp::from_ticks(101)).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PoseTrack {
    poses: StreamBuffer<Transform3D>,
}

impl Default for PoseTrack {
    fn default() -> Self {
        Self::new(DEFAULT_POSE_CAPACITY)
    }
}

impl PoseTrack {
    /// Creates a track holding at most `capacity` poses.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            poses: StreamBuffer::new(capacity),
        }
    }

    /// Records a pose.
    ///
    /// Returns `false` if `timestamp` is older than the newest recorded pose.
    pub fn record(&mut self, timestamp: Timestamp, rig_to_world: Transform3D) -> bool {
        self.poses.push(timestamp, rig_to_world)
    }

    /// Returns the number of recorded poses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Returns true if no pose has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Returns the newest recorded pose.
    #[must_use]
    pub fn latest(&self) -> Option<&(Timestamp, Transform3D)> {
        self.poses.latest()
    }

    /// Drops poses older than `timestamp`.
    pub fn forget_before(&mut self, timestamp: Timestamp) {
        self.poses.remove_before(timestamp);
    }

    /// Drops poses more than `window` older than the newest one.
    ///
    /// Consumers call this once per tick to bound lookups to recent motion.
    pub fn retain_window(&mut self, window: Duration) {
        let cutoff = self
            .poses
            .latest()
            .and_then(|(newest, _)| newest.checked_sub(window));
        if let Some(cutoff) = cutoff {
            self.poses.remove_before(cutoff);
        }
    }

    /// Drops all poses.
    pub fn clear(&mut self) {
        self.poses.clear();
    }
}

impl SpatialTracker for PoseTrack {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn locate(&self, timestamp: Timestamp) -> Option<Transform3D> {
        let (before, after) = self.poses.find_bracket(timestamp)?;
        let (t0, p0) = self.poses.get(before)?;
        if before == after {
            return Some(*p0);
        }
        let (t1, p1) = self.poses.get(after)?;

        let span = t1.abs_diff(*t0).as_ticks();
        if span == 0 {
            return Some(*p0);
        }
        let t = timestamp.abs_diff(*t0).as_ticks() as f64 / span as f64;
        Some(p0.lerp(p1, t as f32))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    fn ts(ticks: u64) -> Timestamp {
        Timestamp::from_ticks(ticks)
    }

    #[test]
    fn empty_track_cannot_locate() {
        let track = PoseTrack::default();
        assert!(track.is_empty());
        assert!(track.locate(ts(0)).is_none());
    }

    #[test]
    fn exact_hit_returns_recorded_pose() {
        let mut track = PoseTrack::new(4);
        let pose = Transform3D::from_translation(Vec3::new(1.0, 2.0, 3.0));
        track.record(ts(50), pose);
        assert_eq!(track.locate(ts(50)), Some(pose));
    }

    #[test]
    fn interpolates_rotation() {
        let mut track = PoseTrack::new(4);
        track.record(ts(0), Transform3D::identity());
        track.record(
            ts(200),
            Transform3D::from_rotation(Quat::from_rotation_y(FRAC_PI_2)),
        );

        let mid = track.locate(ts(100)).unwrap();
        let expected = Quat::from_rotation_y(FRAC_PI_2 / 2.0);
        assert!(mid.rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn outside_range_is_unlocated() {
        let mut track = PoseTrack::new(4);
        track.record(ts(10), Transform3D::identity());
        track.record(ts(20), Transform3D::identity());
        assert!(track.locate(ts(9)).is_none());
        assert!(track.locate(ts(21)).is_none());
    }

    #[test]
    fn rejects_out_of_order_and_evicts_oldest() {
        let mut track = PoseTrack::new(2);
        assert!(track.record(ts(10), Transform3D::identity()));
        assert!(!track.record(ts(5), Transform3D::identity()));
        track.record(ts(20), Transform3D::identity());
        track.record(ts(30), Transform3D::identity());

        assert_eq!(track.len(), 2);
        assert!(track.locate(ts(15)).is_none());
        assert_eq!(track.latest().unwrap().0, ts(30));

        track.forget_before(ts(25));
        assert_eq!(track.len(), 1);
        track.clear();
        assert!(track.is_empty());
    }

    #[test]
    fn retain_window_keeps_recent_motion() {
        let mut track = PoseTrack::new(8);
        track.retain_window(Duration::from_ticks(5));
        for t in [0, 10, 20, 30] {
            track.record(ts(t), Transform3D::identity());
        }

        track.retain_window(Duration::from_ticks(15));
        assert_eq!(track.len(), 2);
        assert!(track.locate(ts(12)).is_none());
        assert!(track.locate(ts(25)).is_some());

        // A window longer than the clock keeps everything
        track.retain_window(Duration::from_ticks(1_000));
        assert_eq!(track.len(), 2);
    }
}
