//! Seeded surface fitting for depth point clouds.
//!
//! Defines the interface to a geometric surface fitter (planes, spheres,
//! cylinders, cones, tori grown from a seed point) and runs fits one at a
//! time on a background thread so the consumer never blocks on them.
//!
//! # Fitting
//!
//! - [`SurfaceFitter`] - Fitter interface (parameters, cloud, search)
//! - [`FitParams`] / [`ErrorLevel`] / [`SearchLevel`] - Distance-scaled tolerances
//! - [`SeedRadius`] / [`head_forward_distance`] - Seed region sizing
//! - [`FitScheduler`] / [`FitRequest`] - Single-flight background fitting
//!
//! # Results
//!
//! - [`FittedSurface`] / [`Primitive`] - Fitted geometry
//! - [`PlaneOrientation`] - Wall, floor or ceiling classification
//! - [`check_status`] - Native status code mapping
//!
//! # Example
//!
//! ```
//! use surface_fit::{ErrorLevel, FitParams, SeedRadius, head_forward_distance};
//! use glam::Vec3;
//!
//! // Seed point picked 2 m in front of the viewer
//! let distance = head_forward_distance(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.3, 0.0, -2.0));
//! let params = FitParams::for_distance(distance, ErrorLevel::Normal);
//! let radius = SeedRadius::NORMAL.at_distance(distance);
//!
//! assert!(params.validate().is_ok());
//! assert!((radius - 0.2).abs() < 1e-6);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod fitter;
mod params;
mod scheduler;
mod seed;
mod surface;

// Re-export fitting types
pub use fitter::SurfaceFitter;
pub use params::{
    ACCURACY_PER_METRE, BASE_ACCURACY, ErrorLevel, FitParams, MEAN_DISTANCE_FACTOR,
    MEAN_DISTANCE_PER_METRE, SearchLevel,
};
pub use scheduler::{
    DEFAULT_FIT_THREAD_NAME, FitId, FitOutcome, FitRequest, FitScheduler, Submission,
};
pub use seed::{SeedRadius, head_forward_distance};

// Re-export result types
pub use surface::{
    FeatureType, FittedSurface, LEVEL_THRESHOLD, PlaneOrientation, Primitive, WALL_THRESHOLD,
};

// Re-export error types
pub use error::{FitError, Result, check_status, status};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        ErrorLevel, FeatureType, FitError, FitParams, FitRequest, FitScheduler, FittedSurface,
        PlaneOrientation, Primitive, SeedRadius, Submission, SurfaceFitter,
    };
}
