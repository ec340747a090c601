//! Rigid transforms between camera, rig and world frames.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CaptureError, Result};

/// Determinant magnitude below which a matrix is treated as singular.
const SINGULAR_DETERMINANT: f32 = 1e-6;

/// Scale deviation from 1 tolerated before warning about a non-rigid matrix.
const RIGID_SCALE_TOLERANCE: f32 = 1e-3;

/// Rotation followed by translation, mapping points of a source frame into
/// a target frame.
///
/// Names in this crate read `source_to_target`: `camera_to_rig` takes
/// camera-space points into the rig frame.
///
/// # Example
///
/// ```
/// use depth_pipeline::Transform3D;
/// use glam::Vec3;
///
/// // Camera mounted 10 cm above the rig origin
/// let camera_to_rig = Transform3D::from_translation(Vec3::new(0.0, 0.1, 0.0));
/// let p = camera_to_rig.apply_point(Vec3::new(0.0, 0.0, 2.0));
/// assert!((p - Vec3::new(0.0, 0.1, 2.0)).length() < 1e-6);
///
/// // Ray directions only rotate
/// assert!((camera_to_rig.apply_direction(Vec3::Z) - Vec3::Z).length() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    /// Unit quaternion applied first.
    pub rotation: Quat,

    /// Offset applied after rotation.
    pub translation: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// Maps every frame onto itself.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(Quat::IDENTITY, Vec3::ZERO)
    }

    /// Creates a pure offset.
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(Quat::IDENTITY, translation)
    }

    /// Creates a pure rotation about the origin.
    #[must_use]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self::new(rotation, Vec3::ZERO)
    }

    /// Creates a transform that rotates by `rotation`, then offsets by
    /// `translation`.
    #[must_use]
    pub const fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Extracts the rigid part of a column-vector matrix, as delivered by
    /// sensor drivers for extrinsics.
    ///
    /// Any scale is discarded with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::SingularExtrinsics`] for a non-finite or
    /// non-invertible matrix.
    pub fn try_from_matrix(matrix: Mat4) -> Result<Self> {
        let determinant = matrix.determinant();
        if !determinant.is_finite() || determinant.abs() < SINGULAR_DETERMINANT {
            return Err(CaptureError::singular_extrinsics(determinant));
        }

        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        if (scale - Vec3::ONE).abs().max_element() > RIGID_SCALE_TOLERANCE {
            warn!(?scale, "Extrinsics carry scale; keeping rotation and translation only");
        }

        Ok(Self::new(rotation.normalize(), translation))
    }

    /// Returns the equivalent column-vector matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Maps a position into the target frame.
    #[must_use]
    pub fn apply_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// Maps a direction into the target frame, ignoring translation.
    #[must_use]
    pub fn apply_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    /// Returns the transform mapping the target frame back to the source.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let back = self.rotation.conjugate();
        Self::new(back, back * -self.translation)
    }

    /// Chains `inner` before `self`.
    ///
    /// `rig_to_world.compose(&camera_to_rig)` is `camera_to_world`.
    #[must_use]
    pub fn compose(&self, inner: &Self) -> Self {
        Self::new(
            self.rotation * inner.rotation,
            self.apply_point(inner.translation),
        )
    }

    /// Blends towards `other`, slerping rotation and lerping translation.
    ///
    /// Used to estimate a pose between two timestamped samples.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::new(
            self.rotation.slerp(other.rotation, t),
            self.translation.lerp(other.translation, t),
        )
    }

    /// Returns true if both rotation and translation are within `epsilon`
    /// of the identity.
    #[must_use]
    pub fn is_identity(&self, epsilon: f32) -> bool {
        self.rotation.abs_diff_eq(Quat::IDENTITY, epsilon)
            && self.translation.abs_diff_eq(Vec3::ZERO, epsilon)
    }
}
