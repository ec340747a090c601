//! Seed region sizing.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Seed region radius expressed per metre of viewing distance.
///
/// The seed region should cover the same angular size whatever the distance
/// to the surface, so the radius is stored at one metre and scaled by the
/// distance of the seed point.
///
/// # Example
///
/// ```
/// use surface_fit::SeedRadius;
///
/// let mut seed = SeedRadius::NORMAL;
/// assert!((seed.at_distance(2.0) - 0.2).abs() < 1e-6);
///
/// // Out-of-range values are ignored by `set`, clamped by `adjust`
/// assert!(!seed.set(1.0));
/// seed.adjust(1.0);
/// assert!((seed.per_metre() - SeedRadius::MAX_PER_METRE).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct SeedRadius {
    per_metre: f32,
}

impl SeedRadius {
    /// Smallest radius at one metre (5 mm).
    pub const MIN_PER_METRE: f32 = 0.005;
    /// Largest radius at one metre (0.6 m).
    pub const MAX_PER_METRE: f32 = 0.6;

    /// Very small preset (2.5 cm at one metre).
    pub const VERY_SMALL: Self = Self { per_metre: 0.025 };
    /// Small preset (5 cm at one metre).
    pub const SMALL: Self = Self { per_metre: 0.05 };
    /// Normal preset (10 cm at one metre).
    pub const NORMAL: Self = Self { per_metre: 0.1 };
    /// Large preset (20 cm at one metre).
    pub const LARGE: Self = Self { per_metre: 0.2 };
    /// Very large preset (40 cm at one metre).
    pub const VERY_LARGE: Self = Self { per_metre: 0.4 };

    /// Creates a seed radius, returning `None` outside the allowed range.
    #[must_use]
    pub fn new(per_metre: f32) -> Option<Self> {
        Self::in_range(per_metre).then_some(Self { per_metre })
    }

    fn in_range(per_metre: f32) -> bool {
        (Self::MIN_PER_METRE..=Self::MAX_PER_METRE).contains(&per_metre)
    }

    /// Returns the radius at one metre.
    #[must_use]
    pub const fn per_metre(self) -> f32 {
        self.per_metre
    }

    /// Sets the radius at one metre.
    ///
    /// Out-of-range values are ignored; returns whether the value was taken.
    pub fn set(&mut self, per_metre: f32) -> bool {
        if !Self::in_range(per_metre) {
            return false;
        }
        self.per_metre = per_metre;
        true
    }

    /// Grows or shrinks the radius, clamping to the allowed range.
    pub fn adjust(&mut self, delta: f32) {
        let value = self.per_metre + delta;
        if value.is_nan() {
            return;
        }
        self.per_metre = value.clamp(Self::MIN_PER_METRE, Self::MAX_PER_METRE);
    }

    /// Returns the radius for a seed point `distance` metres away.
    #[must_use]
    pub fn at_distance(self, distance: f32) -> f32 {
        self.per_metre * distance
    }
}

impl Default for SeedRadius {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f32> for SeedRadius {
    type Error = FitError;

    fn try_from(per_metre: f32) -> Result<Self, Self::Error> {
        Self::new(per_metre).ok_or_else(|| {
            FitError::invalid_argument(format!(
                "seed radius {per_metre} outside [{}, {}]",
                Self::MIN_PER_METRE,
                Self::MAX_PER_METRE
            ))
        })
    }
}

impl From<SeedRadius> for f32 {
    fn from(seed: SeedRadius) -> Self {
        seed.per_metre
    }
}

/// Distance from the head to a point, measured along the head's forward
/// direction.
///
/// `head_forward` is expected to be unit length.
///
/// # Example
///
/// ```
/// use surface_fit::head_forward_distance;
/// use glam::Vec3;
///
/// // Point 2 m ahead and 1 m to the side
/// let d = head_forward_distance(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(1.0, 0.0, -2.0));
/// assert!((d - 2.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn head_forward_distance(head_position: Vec3, head_forward: Vec3, point: Vec3) -> f32 {
    (head_position - point).dot(-head_forward).abs()
}
