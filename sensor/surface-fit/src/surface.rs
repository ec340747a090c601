//! Fitted surface primitives.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Normal-to-up alignment below which a plane is a wall.
pub const WALL_THRESHOLD: f32 = 0.15;

/// Normal-to-up alignment above which a plane is level.
pub const LEVEL_THRESHOLD: f32 = 0.99;

/// Kind of surface to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FeatureType {
    /// Let the fitter choose the best-matching kind.
    #[default]
    Any,
    /// A bounded plane.
    Plane,
    /// A sphere.
    Sphere,
    /// A finite cylinder.
    Cylinder,
    /// A truncated cone.
    Cone,
    /// A torus.
    Torus,
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Any => "any",
            Self::Plane => "plane",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Cone => "cone",
            Self::Torus => "torus",
        };
        f.write_str(name)
    }
}

/// Geometry of a fitted surface.
///
/// All positions are in the frame of the point cloud that was fitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    /// Rectangle bounding the inliers of a plane.
    Plane {
        /// Lower-left corner.
        lower_left: Vec3,
        /// Lower-right corner.
        lower_right: Vec3,
        /// Upper-right corner.
        upper_right: Vec3,
        /// Upper-left corner.
        upper_left: Vec3,
    },
    /// A sphere.
    Sphere {
        /// Centre.
        center: Vec3,
        /// Radius.
        radius: f32,
    },
    /// A cylinder between two cap centres.
    Cylinder {
        /// Bottom cap centre.
        bottom: Vec3,
        /// Top cap centre.
        top: Vec3,
        /// Radius.
        radius: f32,
    },
    /// A truncated cone between two cap centres.
    Cone {
        /// Bottom cap centre.
        bottom: Vec3,
        /// Top cap centre.
        top: Vec3,
        /// Bottom cap radius.
        bottom_radius: f32,
        /// Top cap radius.
        top_radius: f32,
    },
    /// A torus.
    Torus {
        /// Centre.
        center: Vec3,
        /// Axis of symmetry.
        normal: Vec3,
        /// Distance from the centre to the tube centre.
        mean_radius: f32,
        /// Tube radius.
        tube_radius: f32,
    },
}

impl Primitive {
    /// Returns the kind of this primitive.
    #[must_use]
    pub const fn feature_type(&self) -> FeatureType {
        match self {
            Self::Plane { .. } => FeatureType::Plane,
            Self::Sphere { .. } => FeatureType::Sphere,
            Self::Cylinder { .. } => FeatureType::Cylinder,
            Self::Cone { .. } => FeatureType::Cone,
            Self::Torus { .. } => FeatureType::Torus,
        }
    }

    /// Returns the geometric centre.
    ///
    /// For planes this is the centre of the bounding rectangle; for
    /// cylinders and cones the midpoint of the axis.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        match *self {
            Self::Plane {
                lower_left,
                lower_right,
                upper_right,
                upper_left,
            } => (lower_left + lower_right + upper_right + upper_left) * 0.25,
            Self::Sphere { center, .. } | Self::Torus { center, .. } => center,
            Self::Cylinder { bottom, top, .. } | Self::Cone { bottom, top, .. } => {
                (bottom + top) * 0.5
            }
        }
    }

    /// Moves the primitive into another frame.
    ///
    /// Positions are rotated then translated; the torus axis is only rotated.
    #[must_use]
    pub fn transformed_by(&self, rotation: Quat, translation: Vec3) -> Self {
        let point = |p: Vec3| rotation * p + translation;
        match *self {
            Self::Plane {
                lower_left,
                lower_right,
                upper_right,
                upper_left,
            } => Self::Plane {
                lower_left: point(lower_left),
                lower_right: point(lower_right),
                upper_right: point(upper_right),
                upper_left: point(upper_left),
            },
            Self::Sphere { center, radius } => Self::Sphere {
                center: point(center),
                radius,
            },
            Self::Cylinder {
                bottom,
                top,
                radius,
            } => Self::Cylinder {
                bottom: point(bottom),
                top: point(top),
                radius,
            },
            Self::Cone {
                bottom,
                top,
                bottom_radius,
                top_radius,
            } => Self::Cone {
                bottom: point(bottom),
                top: point(top),
                bottom_radius,
                top_radius,
            },
            Self::Torus {
                center,
                normal,
                mean_radius,
                tube_radius,
            } => Self::Torus {
                center: point(center),
                normal: rotation * normal,
                mean_radius,
                tube_radius,
            },
        }
    }

    /// Returns the unit normal of a plane, oriented toward the viewer.
    ///
    /// `look` is the viewing direction in the primitive's frame. Returns
    /// `None` for other primitives or a degenerate rectangle.
    #[must_use]
    pub fn facing_normal(&self, look: Vec3) -> Option<Vec3> {
        let Self::Plane {
            lower_left,
            upper_right,
            upper_left,
            ..
        } = *self
        else {
            return None;
        };

        let front = lower_left - upper_left;
        let right = upper_right - upper_left;
        let normal = front.cross(right).try_normalize()?;
        if normal.dot(look) > 0.0 {
            Some(-normal)
        } else {
            Some(normal)
        }
    }

    /// Classifies a plane against the world up direction.
    ///
    /// Returns `None` for other primitives or a degenerate rectangle.
    #[must_use]
    pub fn plane_orientation(&self, look: Vec3, up: Vec3) -> Option<PlaneOrientation> {
        let normal = self.facing_normal(look)?;
        Some(PlaneOrientation::classify(normal, up.try_normalize()?))
    }
}

/// A surface found by a fitter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedSurface {
    /// Root-mean-square distance of the inliers to the surface.
    pub rms: f32,

    /// Fitted geometry.
    pub primitive: Primitive,
}

impl FittedSurface {
    /// Creates a fitted surface.
    #[must_use]
    pub const fn new(rms: f32, primitive: Primitive) -> Self {
        Self { rms, primitive }
    }

    /// Returns the kind of the fitted primitive.
    #[must_use]
    pub const fn feature_type(&self) -> FeatureType {
        self.primitive.feature_type()
    }

    /// Moves the surface into another frame.
    #[must_use]
    pub fn transformed_by(&self, rotation: Quat, translation: Vec3) -> Self {
        Self {
            rms: self.rms,
            primitive: self.primitive.transformed_by(rotation, translation),
        }
    }
}

/// How a fitted plane sits relative to gravity.
///
/// # Example
///
/// ```
/// use surface_fit::PlaneOrientation;
/// use glam::Vec3;
///
/// assert_eq!(PlaneOrientation::classify(Vec3::Y, Vec3::Y), PlaneOrientation::Floor);
/// assert_eq!(PlaneOrientation::classify(Vec3::X, Vec3::Y), PlaneOrientation::Wall);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneOrientation {
    /// Normal roughly horizontal.
    Wall,
    /// Normal pointing up.
    Floor,
    /// Normal pointing down.
    Ceiling,
    /// Tilted, normal leaning up.
    FloorSlope,
    /// Tilted, normal leaning down.
    CeilingSlope,
}

impl PlaneOrientation {
    /// Classifies a unit plane normal against a unit up direction.
    #[must_use]
    pub fn classify(normal: Vec3, up: Vec3) -> Self {
        let alignment = normal.dot(up);
        let magnitude = alignment.abs();
        if magnitude < WALL_THRESHOLD {
            Self::Wall
        } else if magnitude > LEVEL_THRESHOLD {
            if alignment > 0.0 {
                Self::Floor
            } else {
                Self::Ceiling
            }
        } else if alignment > 0.0 {
            Self::FloorSlope
        } else {
            Self::CeilingSlope
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    /// Unit square in the XZ plane at height `y`, viewed from above.
    fn horizontal_square(y: f32) -> Primitive {
        Primitive::Plane {
            lower_left: Vec3::new(0.0, y, 1.0),
            lower_right: Vec3::new(1.0, y, 1.0),
            upper_right: Vec3::new(1.0, y, 0.0),
            upper_left: Vec3::new(0.0, y, 0.0),
        }
    }

    #[test]
    fn feature_types() {
        assert_eq!(horizontal_square(0.0).feature_type(), FeatureType::Plane);
        let sphere = Primitive::Sphere {
            center: Vec3::ZERO,
            radius: 1.0,
        };
        assert_eq!(
            FittedSurface::new(0.001, sphere).feature_type(),
            FeatureType::Sphere
        );
        assert_eq!(FeatureType::Cylinder.to_string(), "cylinder");
    }

    #[test]
    fn centers() {
        let plane_center = horizontal_square(2.0).center();
        assert!((plane_center - Vec3::new(0.5, 2.0, 0.5)).length() < 1e-6);

        let cone = Primitive::Cone {
            bottom: Vec3::ZERO,
            top: Vec3::new(0.0, 2.0, 0.0),
            bottom_radius: 1.0,
            top_radius: 0.5,
        };
        assert!((cone.center() - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn floor_seen_from_above() {
        let floor = horizontal_square(0.0);
        let look = Vec3::NEG_Y;
        let normal = floor.facing_normal(look).unwrap();
        assert!((normal - Vec3::Y).length() < 1e-6);
        assert_eq!(
            floor.plane_orientation(look, Vec3::Y),
            Some(PlaneOrientation::Floor)
        );
    }

    #[test]
    fn ceiling_seen_from_below() {
        let ceiling = horizontal_square(2.5);
        assert_eq!(
            ceiling.plane_orientation(Vec3::Y, Vec3::Y),
            Some(PlaneOrientation::Ceiling)
        );
    }

    #[test]
    fn slopes_and_walls() {
        let tilt = Vec3::new(0.0, 0.5, 0.5).normalize();
        assert_eq!(
            PlaneOrientation::classify(tilt, Vec3::Y),
            PlaneOrientation::FloorSlope
        );
        assert_eq!(
            PlaneOrientation::classify(-tilt, Vec3::Y),
            PlaneOrientation::CeilingSlope
        );
        let nearly_vertical = Vec3::new(1.0, 0.1, 0.0).normalize();
        assert_eq!(
            PlaneOrientation::classify(nearly_vertical, Vec3::Y),
            PlaneOrientation::Wall
        );
    }

    #[test]
    fn non_plane_has_no_orientation() {
        let sphere = Primitive::Sphere {
            center: Vec3::ZERO,
            radius: 1.0,
        };
        assert!(sphere.facing_normal(Vec3::Z).is_none());
        assert!(sphere.plane_orientation(Vec3::Z, Vec3::Y).is_none());
    }

    #[test]
    fn degenerate_plane_has_no_normal() {
        let line = Primitive::Plane {
            lower_left: Vec3::ZERO,
            lower_right: Vec3::X,
            upper_right: Vec3::X,
            upper_left: Vec3::ZERO,
        };
        assert!(line.facing_normal(Vec3::Z).is_none());
    }

    #[test]
    fn transform_moves_points_and_rotates_axes() {
        let torus = Primitive::Torus {
            center: Vec3::new(1.0, 0.0, 0.0),
            normal: Vec3::Y,
            mean_radius: 0.3,
            tube_radius: 0.05,
        };
        let moved = torus.transformed_by(Quat::from_rotation_z(FRAC_PI_2), Vec3::new(0.0, 0.0, 4.0));

        let Primitive::Torus {
            center,
            normal,
            mean_radius,
            ..
        } = moved
        else {
            panic!("torus changed kind");
        };
        assert!((center - Vec3::new(0.0, 1.0, 4.0)).length() < 1e-5);
        assert!((normal - Vec3::NEG_X).length() < 1e-5);
        assert_relative_eq!(mean_radius, 0.3);
    }

    #[test]
    fn surface_json_round_trip() {
        let surface = FittedSurface::new(
            0.002,
            Primitive::Cylinder {
                bottom: Vec3::ZERO,
                top: Vec3::Y,
                radius: 0.1,
            },
        );
        let json = serde_json::to_string(&surface).unwrap();
        let parsed: FittedSurface = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, surface);
    }
}
