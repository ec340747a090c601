//! Selecting the point a world-space ray is aimed at.
//!
//! A point counts as "on the ray" when it lies inside a narrow cone around
//! the ray. Among those, the one closest to the ray axis wins. When no point
//! is inside the cone, the point with the smallest angle to the ray is used
//! instead.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::transform::Transform3D;

/// Default probe radius in metres.
pub const DEFAULT_PROBE_RADIUS: f32 = 0.015;

/// A world-space ray.
///
/// The direction does not need to be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Ray direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray.
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Transforms the ray into another frame.
    #[must_use]
    pub fn transformed_by(&self, transform: &Transform3D) -> Self {
        Self {
            origin: transform.apply_point(self.origin),
            direction: transform.apply_direction(self.direction),
        }
    }
}

/// Picks the index of the point a ray is aimed at.
///
/// `points` are in camera space; `camera_to_world` places them in the
/// ray's world frame. Points behind the origin are ignored.
///
/// Returns `None` if the ray direction is degenerate or no point lies in
/// front of the origin.
///
/// # Example
///
/// ```
/// use depth_pipeline::{pick, Ray, Transform3D, DEFAULT_PROBE_RADIUS};
/// use glam::Vec3;
///
/// let points = [Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 2.0)];
/// let ray = Ray::new(Vec3::ZERO, Vec3::Z);
///
/// let hit = pick(&ray, &points, &Transform3D::identity(), DEFAULT_PROBE_RADIUS);
/// assert_eq!(hit, Some(0));
/// ```
#[must_use]
pub fn pick(
    ray: &Ray,
    points: &[Vec3],
    camera_to_world: &Transform3D,
    probe_radius: f32,
) -> Option<usize> {
    let local = ray.transformed_by(&camera_to_world.inverse());
    let direction = local.direction.try_normalize()?;
    let cone = probe_radius.mul_add(probe_radius, 1.0);

    // (index, squared distance to the axis)
    let mut nearest_inside: Option<(usize, f32)> = None;
    // (index, cosine of the angle to the axis)
    let mut nearest_outside: Option<(usize, f32)> = None;

    for (index, point) in points.iter().enumerate() {
        let v = *point - local.origin;
        let along = v.dot(direction);
        let dist_sq = v.length_squared();
        // Non-finite points never rank, even as outside candidates
        if along.is_nan() || along < f32::EPSILON || !dist_sq.is_finite() {
            continue;
        }

        let along_sq = along * along;
        if dist_sq < cone * along_sq {
            let axis_sq = dist_sq - along_sq;
            if nearest_inside.is_none_or(|(_, best)| axis_sq < best) {
                nearest_inside = Some((index, axis_sq));
            }
        } else {
            let cos = along / dist_sq.sqrt();
            if nearest_outside.is_none_or(|(_, best)| cos > best) {
                nearest_outside = Some((index, cos));
            }
        }
    }

    nearest_inside.or(nearest_outside).map(|(index, _)| index)
}
