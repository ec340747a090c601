//! Composition of camera, rig and world frames.
//!
//! The sensor driver reports a fixed rig-to-camera extrinsic once. A spatial
//! tracker reports where the rig is in the world at a given time. Chaining
//! the inverted extrinsic with the rig pose places a point cloud in world
//! space.

use depth_types::Timestamp;
use glam::Mat4;
use tracing::debug;

use crate::error::Result;
use crate::transform::Transform3D;

/// Source of rig-to-world poses.
///
/// Implementations return `None` when the rig cannot be located at the
/// requested time.
///
/// Closures of the form `Fn(Timestamp) -> Option<Transform3D>` implement this
/// trait directly.
pub trait SpatialTracker {
    /// Returns the rig-to-world transform at `timestamp`.
    fn locate(&self, timestamp: Timestamp) -> Option<Transform3D>;
}

impl<F> SpatialTracker for F
where
    F: Fn(Timestamp) -> Option<Transform3D>,
{
    fn locate(&self, timestamp: Timestamp) -> Option<Transform3D> {
        self(timestamp)
    }
}

/// Composes camera-to-rig with rig-to-world.
///
/// Camera-to-rig is applied first.
///
/// # Example
///
/// ```
/// use depth_pipeline::{camera_to_world, Transform3D};
/// use glam::Vec3;
///
/// let camera_to_rig = Transform3D::from_translation(Vec3::new(0.0, 0.1, 0.0));
/// let rig_to_world = Transform3D::from_translation(Vec3::new(2.0, 0.0, 0.0));
///
/// let t = camera_to_world(&camera_to_rig, &rig_to_world);
/// assert!((t.apply_point(Vec3::ZERO) - Vec3::new(2.0, 0.1, 0.0)).length() < 1e-6);
/// ```
#[must_use]
pub fn camera_to_world(camera_to_rig: &Transform3D, rig_to_world: &Transform3D) -> Transform3D {
    rig_to_world.compose(camera_to_rig)
}

/// Caches the sensor extrinsics and composes them with tracked rig poses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameComposer {
    rig_to_camera: Transform3D,
    camera_to_rig: Transform3D,
}

impl FrameComposer {
    /// Creates a composer from the driver's rig-to-camera matrix.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::SingularExtrinsics`](crate::CaptureError::SingularExtrinsics)
    /// if the matrix cannot be inverted.
    pub fn from_extrinsics(rig_to_camera: Mat4) -> Result<Self> {
        let rig_to_camera = Transform3D::try_from_matrix(rig_to_camera)?;
        let camera_to_rig = rig_to_camera.inverse();
        debug!(
            translation = ?camera_to_rig.translation,
            "Cached camera-to-rig extrinsics"
        );
        Ok(Self {
            rig_to_camera,
            camera_to_rig,
        })
    }

    /// Creates a composer from an already inverted camera-to-rig transform.
    #[must_use]
    pub fn from_camera_to_rig(camera_to_rig: Transform3D) -> Self {
        Self {
            rig_to_camera: camera_to_rig.inverse(),
            camera_to_rig,
        }
    }

    /// Returns the driver-reported rig-to-camera transform.
    #[must_use]
    pub const fn rig_to_camera(&self) -> &Transform3D {
        &self.rig_to_camera
    }

    /// Returns the cached camera-to-rig transform.
    #[must_use]
    pub const fn camera_to_rig(&self) -> &Transform3D {
        &self.camera_to_rig
    }

    /// Composes the cached extrinsics with a known rig pose.
    #[must_use]
    pub fn camera_to_world(&self, rig_to_world: &Transform3D) -> Transform3D {
        camera_to_world(&self.camera_to_rig, rig_to_world)
    }

    /// Looks up the rig pose at `timestamp` and composes it.
    ///
    /// Returns `None` if the tracker cannot locate the rig.
    #[must_use]
    pub fn camera_to_world_at<T>(&self, tracker: &T, timestamp: Timestamp) -> Option<Transform3D>
    where
        T: SpatialTracker + ?Sized,
    {
        let rig_to_world = tracker.locate(timestamp)?;
        Some(self.camera_to_world(&rig_to_world))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn composition_order() {
        let camera_to_rig = Transform3D::from_rotation(Quat::from_rotation_z(FRAC_PI_2));
        let rig_to_world = Transform3D::from_translation(Vec3::new(0.0, 0.0, 5.0));

        let t = camera_to_world(&camera_to_rig, &rig_to_world);
        let p = t.apply_point(Vec3::X);
        assert!((p - Vec3::new(0.0, 1.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn composer_inverts_extrinsics() {
        let rig_to_camera = Transform3D::from_translation(Vec3::new(0.0, -0.1, 0.0));
        let composer = FrameComposer::from_extrinsics(rig_to_camera.to_matrix()).unwrap();

        // Camera origin sits 0.1 above the rig origin
        let origin = composer.camera_to_rig().apply_point(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.1, 0.0)).length() < 1e-6);
        assert!(
            composer
                .rig_to_camera()
                .compose(composer.camera_to_rig())
                .is_identity(1e-5)
        );
    }

    #[test]
    fn composer_rejects_singular() {
        assert!(FrameComposer::from_extrinsics(Mat4::ZERO).is_err());
    }

    #[test]
    fn composer_unlocated_rig() {
        let composer = FrameComposer::from_camera_to_rig(Transform3D::identity());
        let lost = |_: Timestamp| -> Option<Transform3D> { None };
        assert!(
            composer
                .camera_to_world_at(&lost, Timestamp::from_ticks(1))
                .is_none()
        );
    }

    #[test]
    fn composer_located_rig() {
        let composer =
            FrameComposer::from_camera_to_rig(Transform3D::from_translation(Vec3::new(0.0, 0.1, 0.0)));
        let tracker =
            |_: Timestamp| Some(Transform3D::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        let t = composer
            .camera_to_world_at(&tracker, Timestamp::from_ticks(1))
            .unwrap();
        assert!((t.apply_point(Vec3::ZERO) - Vec3::new(1.0, 0.1, 0.0)).length() < 1e-6);
    }
}
