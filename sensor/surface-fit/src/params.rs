//! Fitting parameters derived from viewing distance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Base measurement accuracy at one metre (2 mm).
pub const BASE_ACCURACY: f32 = 0.002;

/// Accuracy growth per metre beyond the first (1.2 mm).
pub const ACCURACY_PER_METRE: f32 = 0.0012;

/// Mean point spacing per metre of distance (5.2 mm).
pub const MEAN_DISTANCE_PER_METRE: f32 = 0.0052;

/// Multiplier applied to the mean point spacing.
pub const MEAN_DISTANCE_FACTOR: f32 = 5.0;

/// How aggressively a fitter grows a surface beyond its seed region.
///
/// Ranges from 0 (off) to 10 (radical).
///
/// # Example
///
/// ```
/// use surface_fit::SearchLevel;
///
/// assert_eq!(SearchLevel::default(), SearchLevel::DEFAULT);
/// assert_eq!(SearchLevel::new(5), Some(SearchLevel::DEFAULT));
/// assert!(SearchLevel::new(11).is_none());
/// assert_eq!(SearchLevel::clamped(40), SearchLevel::RADICAL);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SearchLevel(u8);

impl SearchLevel {
    /// No search.
    pub const OFF: Self = Self(0);
    /// Moderate search.
    pub const MODERATE: Self = Self(1);
    /// Default search.
    pub const DEFAULT: Self = Self(5);
    /// Most aggressive search.
    pub const RADICAL: Self = Self(10);

    /// Creates a level, returning `None` above 10.
    #[must_use]
    pub const fn new(level: u8) -> Option<Self> {
        if level > Self::RADICAL.0 {
            return None;
        }
        Some(Self(level))
    }

    /// Creates a level, clamping to 10.
    #[must_use]
    pub const fn clamped(level: u8) -> Self {
        if level > Self::RADICAL.0 {
            Self::RADICAL
        } else {
            Self(level)
        }
    }

    /// Returns the numeric level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for SearchLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for SearchLevel {
    type Error = FitError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
            .ok_or_else(|| FitError::invalid_argument(format!("search level {level} exceeds 10")))
    }
}

impl From<SearchLevel> for u8 {
    fn from(level: SearchLevel) -> Self {
        level.0
    }
}

impl fmt::Display for SearchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {}", self.0)
    }
}

/// Tolerance adjustment on top of the distance-based accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorLevel {
    /// Adds 1 mm.
    #[default]
    Normal,
    /// Adds 3 mm, for noisy or distant surfaces.
    High,
    /// Subtracts 1 mm, for clean close-range surfaces.
    Low,
}

impl ErrorLevel {
    /// Returns the accuracy adjustment in metres.
    #[must_use]
    pub const fn accuracy_offset(self) -> f32 {
        match self {
            Self::Normal => 0.001,
            Self::High => 0.003,
            Self::Low => -0.001,
        }
    }
}

/// Parameters handed to a [`SurfaceFitter`](crate::SurfaceFitter) before a
/// search.
///
/// # Example
///
/// ```
/// use surface_fit::{ErrorLevel, FitParams};
///
/// // Seed point 3 m in front of the viewer
/// let params = FitParams::for_distance(3.0, ErrorLevel::Normal);
/// assert!((params.measurement_accuracy - 0.0054).abs() < 1e-6);
/// assert!((params.mean_distance - 0.078).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    /// Expected measurement error of the points in metres.
    pub measurement_accuracy: f32,

    /// Expected spacing between neighbouring points in metres.
    pub mean_distance: f32,

    /// How far the surface may grow sideways from the seed.
    pub lateral_extension: SearchLevel,

    /// How far the seed region may expand radially.
    pub radial_expansion: SearchLevel,
}

impl Default for FitParams {
    fn default() -> Self {
        Self::for_distance(1.0, ErrorLevel::Normal)
    }
}

impl FitParams {
    /// Derives parameters for a seed point `distance` metres in front of the
    /// viewer.
    ///
    /// Depth noise grows with distance, so accuracy loosens by 1.2 mm per
    /// metre past the first and the expected point spacing scales linearly.
    #[must_use]
    pub fn for_distance(distance: f32, level: ErrorLevel) -> Self {
        let beyond_first_metre = (distance - 1.0).max(0.0);
        let measurement_accuracy =
            BASE_ACCURACY + ACCURACY_PER_METRE * beyond_first_metre + level.accuracy_offset();
        let mean_distance = MEAN_DISTANCE_PER_METRE * distance * MEAN_DISTANCE_FACTOR;

        Self {
            measurement_accuracy,
            mean_distance,
            lateral_extension: SearchLevel::DEFAULT,
            radial_expansion: SearchLevel::DEFAULT,
        }
    }

    /// Set the measurement accuracy.
    #[must_use]
    pub const fn measurement_accuracy(mut self, accuracy: f32) -> Self {
        self.measurement_accuracy = accuracy;
        self
    }

    /// Set the mean point spacing.
    #[must_use]
    pub const fn mean_distance(mut self, distance: f32) -> Self {
        self.mean_distance = distance;
        self
    }

    /// Set the lateral extension level.
    #[must_use]
    pub const fn lateral_extension(mut self, level: SearchLevel) -> Self {
        self.lateral_extension = level;
        self
    }

    /// Set the radial expansion level.
    #[must_use]
    pub const fn radial_expansion(mut self, level: SearchLevel) -> Self {
        self.radial_expansion = level;
        self
    }

    /// Checks that accuracy and spacing are positive and finite.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.measurement_accuracy.is_finite() && self.measurement_accuracy > 0.0) {
            return Err(FitError::invalid_argument(format!(
                "measurement accuracy must be positive, got {}",
                self.measurement_accuracy
            )));
        }
        if !(self.mean_distance.is_finite() && self.mean_distance > 0.0) {
            return Err(FitError::invalid_argument(format!(
                "mean distance must be positive, got {}",
                self.mean_distance
            )));
        }
        Ok(())
    }
}
