//! Depth frame to camera-space point cloud conversion.

use depth_types::{MM_TO_M, RawDepthFrame};
use glam::Vec3;

use crate::intrinsics::UnprojectionEntry;

/// Unprojects a depth frame into camera-space points in metres.
///
/// Depth samples are measured along the pixel ray, so each sample is first
/// divided by the ray's radial scale to get `z`. Pixels with zero effective
/// depth (zero sample or masked) produce no point.
///
/// Only pixels present in every buffer (depth, mask and table) are
/// processed; short buffers yield fewer points instead of panicking.
///
/// # Example
///
/// ```
/// use depth_pipeline::{unproject, IntrinsicsCache};
/// use depth_types::{RawDepthFrame, Resolution, Timestamp};
/// use glam::Vec2;
///
/// let frame = RawDepthFrame::new(Resolution::new(2, 1), vec![0, 1000], Timestamp::zero());
/// let mut cache = IntrinsicsCache::new();
/// let table = cache.ensure(frame.resolution, |_| Vec2::ZERO);
///
/// let points = unproject(&frame, table);
/// assert_eq!(points.len(), 1);
/// assert!((points[0].z - 1.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn unproject(frame: &RawDepthFrame, table: &[UnprojectionEntry]) -> Vec<Vec3> {
    let pixels = frame
        .pixel_count()
        .min(frame.depth.len())
        .min(table.len())
        .min(frame.mask.as_ref().map_or(usize::MAX, Vec::len));
    let mut points = Vec::with_capacity(pixels);

    for (i, (&depth, entry)) in frame.depth.iter().zip(table).take(pixels).enumerate() {
        if depth == 0 || frame.is_masked(i) {
            continue;
        }
        let z = f32::from(depth) * entry.inverse_radial_scale * MM_TO_M;
        points.push(Vec3::new(entry.ray_x * z, entry.ray_y * z, z));
    }

    points
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::intrinsics::IntrinsicsCache;
    use approx::assert_relative_eq;
    use depth_types::{INVALID_MASK_BIT, Resolution, Timestamp};
    use glam::Vec2;

    #[test]
    fn off_axis_pixel_depth_is_radial() {
        // Ray through (0.75, 0) on the unit plane has length 1.25
        let frame = RawDepthFrame::new(Resolution::new(1, 1), vec![1250], Timestamp::zero());
        let mut cache = IntrinsicsCache::new();
        let table = cache.ensure(frame.resolution, |_| Vec2::new(0.75, 0.0));

        let points = unproject(&frame, table);
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(points[0].x, 0.75, epsilon = 1e-6);
        assert_relative_eq!(points[0].length(), 1.25, epsilon = 1e-6);
    }

    #[test]
    fn masked_pixels_are_skipped() {
        let frame = RawDepthFrame::new(Resolution::new(3, 1), vec![500, 600, 700], Timestamp::zero())
            .with_mask(vec![0, INVALID_MASK_BIT | 0x01, 0x7F]);
        let mut cache = IntrinsicsCache::new();
        let table = cache.ensure(frame.resolution, |_| Vec2::ZERO);

        let points = unproject(&frame, table);
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].z, 0.5, epsilon = 1e-6);
        assert_relative_eq!(points[1].z, 0.7, epsilon = 1e-6);
    }

    #[test]
    fn all_invalid_frame_is_empty() {
        let frame = RawDepthFrame::new(Resolution::new(4, 4), vec![0; 16], Timestamp::zero());
        let mut cache = IntrinsicsCache::new();
        let table = cache.ensure(frame.resolution, |_| Vec2::ZERO);
        assert!(unproject(&frame, table).is_empty());
    }

    #[test]
    fn short_buffers_do_not_panic() {
        let frame = RawDepthFrame::new(Resolution::new(4, 1), vec![1000, 1000], Timestamp::zero())
            .with_mask(vec![0]);
        let mut cache = IntrinsicsCache::new();
        let table = cache.ensure(frame.resolution, |_| Vec2::ZERO);
        assert_eq!(unproject(&frame, table).len(), 1);

        // Table built for a smaller frame
        let frame = RawDepthFrame::new(Resolution::new(4, 1), vec![1000; 4], Timestamp::zero());
        assert_eq!(unproject(&frame, &table[..1]).len(), 1);
    }

    #[test]
    fn empty_resolution() {
        let frame = RawDepthFrame::new(Resolution::new(0, 0), Vec::new(), Timestamp::zero());
        assert!(unproject(&frame, &[]).is_empty());
    }
}
