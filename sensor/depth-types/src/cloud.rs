//! Point cloud snapshots produced from depth frames.

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Camera-space point cloud unprojected from a single depth frame.
///
/// Points are in metres; their order carries no meaning for consumers but
/// indices stay stable for the life of the snapshot, so a picked index can be
/// handed to a surface fitter together with [`as_flat`](Self::as_flat).
///
/// # Example
///
/// ```
/// use depth_types::{PointCloudSnapshot, Timestamp};
/// use glam::Vec3;
///
/// let cloud = PointCloudSnapshot::new(
///     vec![Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.1, 0.0, 1.0)],
///     Timestamp::from_ticks(10),
/// );
///
/// assert_eq!(cloud.len(), 2);
/// assert_eq!(cloud.as_flat(), &[0.0, 0.0, 1.0, 0.1, 0.0, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointCloudSnapshot {
    /// Camera-space points in metres.
    pub points: Vec<Vec3>,

    /// Timestamp of the depth frame the points came from.
    pub timestamp: Timestamp,
}

impl PointCloudSnapshot {
    /// Creates a snapshot from unprojected points.
    #[must_use]
    pub const fn new(points: Vec<Vec3>, timestamp: Timestamp) -> Self {
        Self { points, timestamp }
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the snapshot holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Gets a point by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    /// Returns the points as a tightly packed `x, y, z, x, y, z, ...` slice.
    #[must_use]
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.points)
    }
}
