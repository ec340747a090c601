//! Property-based tests for unprojection and picking.
//!
//! Run with: cargo test -p depth-pipeline -- proptest

#![allow(clippy::unwrap_used)]

use depth_pipeline::{IntrinsicsCache, Ray, Transform3D, pick, unproject};
use depth_types::{INVALID_MASK_BIT, RawDepthFrame, Resolution, Timestamp};
use glam::{Quat, Vec2, Vec3};
use proptest::prelude::*;

fn pinhole(uv: Vec2) -> Vec2 {
    (uv - Vec2::new(8.0, 6.0)) / 10.0
}

/// Generate a frame with random depths and an optional random mask.
fn arb_frame() -> impl Strategy<Value = RawDepthFrame> {
    (1u32..16, 1u32..12).prop_flat_map(|(w, h)| {
        let n = (w * h) as usize;
        (
            prop::collection::vec(prop_oneof![Just(0u16), 1u16..8000], n),
            prop::option::of(prop::collection::vec(any::<u8>(), n)),
        )
            .prop_map(move |(depth, mask)| RawDepthFrame {
                resolution: Resolution::new(w, h),
                depth,
                mask,
                timestamp: Timestamp::from_ticks(1),
            })
    })
}

fn arb_point() -> impl Strategy<Value = Vec3> {
    (-2.0f32..2.0, -2.0f32..2.0, -1.0f32..6.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_transform() -> impl Strategy<Value = Transform3D> {
    (
        -3.0f32..3.0,
        -3.0f32..3.0,
        (-5.0f32..5.0, -5.0f32..5.0, -5.0f32..5.0),
    )
        .prop_map(|(yaw, pitch, (x, y, z))| {
            Transform3D::new(
                Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch),
                Vec3::new(x, y, z),
            )
        })
}

proptest! {
    #[test]
    fn proptest_unprojected_length_matches_valid_pixels(frame in arb_frame()) {
        let mut cache = IntrinsicsCache::new();
        let points = unproject(&frame, cache.ensure(frame.resolution, pinhole));

        let expected = frame
            .depth
            .iter()
            .enumerate()
            .filter(|&(i, &d)| {
                let masked = frame
                    .mask
                    .as_ref()
                    .is_some_and(|m| m[i] & INVALID_MASK_BIT != 0);
                d != 0 && !masked
            })
            .count();
        prop_assert_eq!(points.len(), expected);
        prop_assert!(points.iter().all(|p| p.z > 0.0));
    }

    #[test]
    fn proptest_radius_pick_within_cone(
        points in prop::collection::vec(arb_point(), 0..40),
        radius in 0.001f32..0.2,
    ) {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let inside = |p: &Vec3| p.z >= f32::EPSILON
            && p.length_squared() < radius.mul_add(radius, 1.0) * (p.z * p.z);

        match pick(&ray, &points, &Transform3D::identity(), radius) {
            None => prop_assert!(points.iter().all(|p| p.z < f32::EPSILON)),
            Some(index) => {
                prop_assert!(points[index].z >= f32::EPSILON);
                if points.iter().any(inside) {
                    let p = points[index];
                    prop_assert!(inside(&p));
                    // Off-axis distance stays within the cone at that depth
                    let axis = (p.x * p.x + p.y * p.y).sqrt();
                    prop_assert!(axis <= radius * p.z + 1e-3);
                }
            }
        }
    }

    #[test]
    fn proptest_pick_invariant_under_rigid_motion(
        points in prop::collection::vec(arb_point(), 1..20),
        camera_to_world in arb_transform(),
        target in 0usize..20,
    ) {
        // A ray aimed straight at one point picks a point on that ray
        let target = target % points.len();
        prop_assume!(points[target].z > 0.1);

        let origin = camera_to_world.apply_point(Vec3::ZERO);
        let aim = camera_to_world.apply_point(points[target]) - origin;
        let ray = Ray::new(origin, aim);

        let picked = pick(&ray, &points, &camera_to_world, 0.015);
        prop_assert!(picked.is_some());
        let p = points[picked.unwrap()];
        let dir = points[target].normalize();
        let along = p.dot(dir);
        let axis_sq = (p.length_squared() - along * along).max(0.0);
        prop_assert!(axis_sq <= 1e-3 * along * along + 1e-4);
    }
}
