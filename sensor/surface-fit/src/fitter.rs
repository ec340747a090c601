//! Surface fitter interface.

use crate::params::FitParams;
use crate::surface::{FeatureType, FittedSurface};

/// A seeded geometric surface fitter.
///
/// Implementations typically wrap a native fitting library. A search runs in
/// three steps: parameters, then the point cloud, then the search itself.
/// The scheduler always calls them in that order for each request.
///
/// Fitters are moved to a worker thread and must therefore be `Send`.
pub trait SurfaceFitter: Send {
    /// Applies fitting parameters for subsequent searches.
    fn apply_params(&mut self, params: &FitParams);

    /// Replaces the point cloud to search in.
    ///
    /// `points` is tightly packed `x, y, z` triples in metres.
    ///
    /// # Errors
    ///
    /// Returns an error if the fitter cannot accept the cloud, for example
    /// when the slice length is not a multiple of three.
    fn set_point_cloud(&mut self, points: &[f32]) -> crate::Result<()>;

    /// Searches for a surface of the given kind around a seed point.
    ///
    /// `seed_radius` is the radius of the seed region in metres, already
    /// scaled for the distance of the seed point. Returns `Ok(None)` when no
    /// acceptable surface exists there.
    ///
    /// # Errors
    ///
    /// Returns an error for an out-of-range seed, a fitter in the wrong
    /// state, or resource exhaustion.
    fn find_surface(
        &mut self,
        feature: FeatureType,
        seed_index: usize,
        seed_radius: f32,
    ) -> crate::Result<Option<FittedSurface>>;
}

impl<F: SurfaceFitter + ?Sized> SurfaceFitter for Box<F> {
    fn apply_params(&mut self, params: &FitParams) {
        (**self).apply_params(params);
    }

    fn set_point_cloud(&mut self, points: &[f32]) -> crate::Result<()> {
        (**self).set_point_cloud(points)
    }

    fn find_surface(
        &mut self,
        feature: FeatureType,
        seed_index: usize,
        seed_radius: f32,
    ) -> crate::Result<Option<FittedSurface>> {
        (**self).find_surface(feature, seed_index, seed_radius)
    }
}
