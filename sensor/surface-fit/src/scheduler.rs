//! Single-flight scheduling of surface fits on a worker thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use depth_types::{PointCloudSnapshot, Timestamp};
use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::error::FitError;
use crate::fitter::SurfaceFitter;
use crate::params::{ErrorLevel, FitParams};
use crate::seed::SeedRadius;
use crate::surface::{FeatureType, FittedSurface};

/// Default name of the fit worker thread.
pub const DEFAULT_FIT_THREAD_NAME: &str = "surface-fit";

/// Identifier of an accepted fit request.
pub type FitId = u64;

/// A request to fit a surface around one point of a cloud.
#[derive(Debug, Clone)]
pub struct FitRequest {
    /// Kind of surface to search for.
    pub feature: FeatureType,

    /// Index of the seed point in `cloud`.
    pub seed_index: usize,

    /// Seed region radius in metres.
    pub seed_radius: f32,

    /// Fitting parameters.
    pub params: FitParams,

    /// Cloud to search in. Shared so the consumer can keep using it.
    pub cloud: Arc<PointCloudSnapshot>,
}

impl FitRequest {
    /// Creates a request with default parameters and the normal seed radius
    /// at one metre.
    #[must_use]
    pub fn new(cloud: Arc<PointCloudSnapshot>, seed_index: usize, feature: FeatureType) -> Self {
        Self {
            feature,
            seed_index,
            seed_radius: SeedRadius::default().at_distance(1.0),
            params: FitParams::default(),
            cloud,
        }
    }

    /// Creates a request sized for a seed point `distance` metres in front
    /// of the viewer.
    ///
    /// Both the seed region and the fitting tolerances scale with distance.
    #[must_use]
    pub fn at_distance(
        cloud: Arc<PointCloudSnapshot>,
        seed_index: usize,
        feature: FeatureType,
        seed: SeedRadius,
        distance: f32,
        level: ErrorLevel,
    ) -> Self {
        Self {
            feature,
            seed_index,
            seed_radius: seed.at_distance(distance),
            params: FitParams::for_distance(distance, level),
            cloud,
        }
    }

    /// Set the fitting parameters.
    #[must_use]
    pub fn params(mut self, params: FitParams) -> Self {
        self.params = params;
        self
    }

    /// Set the seed region radius in metres.
    #[must_use]
    pub fn seed_radius(mut self, radius: f32) -> Self {
        self.seed_radius = radius;
        self
    }

    fn validate(&self) -> crate::Result<()> {
        if self.seed_index >= self.cloud.len() {
            return Err(FitError::invalid_argument(format!(
                "seed index {} out of range for {} points",
                self.seed_index,
                self.cloud.len()
            )));
        }
        if !(self.seed_radius.is_finite() && self.seed_radius > 0.0) {
            return Err(FitError::invalid_argument(format!(
                "seed radius must be positive, got {}",
                self.seed_radius
            )));
        }
        self.params.validate()
    }
}

/// What happened to a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The request is running under this id.
    Accepted(FitId),
    /// Another request was in flight; this one was discarded.
    Dropped,
}

impl Submission {
    /// Returns true if the request was accepted.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Result of a finished fit.
#[derive(Debug)]
pub struct FitOutcome {
    /// Id returned when the request was accepted.
    pub id: FitId,

    /// Kind of surface that was requested.
    pub feature: FeatureType,

    /// Seed point index in the fitted cloud.
    pub seed_index: usize,

    /// Timestamp of the fitted cloud.
    pub timestamp: Timestamp,

    /// Surface found, `None` if there was none, or the fitter's error.
    pub result: crate::Result<Option<FittedSurface>>,
}

struct InFlight {
    id: FitId,
    feature: FeatureType,
    seed_index: usize,
    timestamp: Timestamp,
    cancelled: bool,
    handle: JoinHandle<crate::Result<Option<FittedSurface>>>,
}

impl InFlight {
    fn join(self) -> Option<FitOutcome> {
        let result = self.handle.join().unwrap_or_else(|_| {
            error!(id = self.id, "Fit worker panicked");
            Err(FitError::WorkerPanicked)
        });

        if self.cancelled {
            debug!(id = self.id, "Discarding cancelled fit");
            return None;
        }
        if let Err(err) = &result {
            warn!(id = self.id, feature = %self.feature, error = %err, "Surface fit failed");
        }

        Some(FitOutcome {
            id: self.id,
            feature: self.feature,
            seed_index: self.seed_index,
            timestamp: self.timestamp,
            result,
        })
    }
}

/// Runs at most one surface fit at a time on a background thread.
///
/// Fits are slow compared to the consumer's frame rate, so requests made
/// while a fit is running are dropped rather than queued. The scheduler
/// stays busy until the running fit finishes and its outcome has been
/// collected with [`poll`](Self::poll) or [`wait`](Self::wait). A cancelled
/// fit is reaped silently once its worker returns.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use depth_types::{PointCloudSnapshot, Timestamp};
/// use glam::Vec3;
/// use surface_fit::{
///     FeatureType, FitParams, FitRequest, FitScheduler, FittedSurface, Primitive, Submission,
///     SurfaceFitter,
/// };
///
/// struct Unit;
///
/// impl SurfaceFitter for Unit {
///     fn apply_params(&mut self, _: &FitParams) {}
///     fn set_point_cloud(&mut self, _: &[f32]) -> surface_fit::Result<()> {
///         Ok(())
///     }
///     fn find_surface(
///         &mut self,
///         _: FeatureType,
///         _: usize,
///         _: f32,
///     ) -> surface_fit::Result<Option<FittedSurface>> {
///         let sphere = Primitive::Sphere { center: Vec3::ZERO, radius: 1.0 };
///         Ok(Some(FittedSurface::new(0.0, sphere)))
///     }
/// }
///
/// let cloud = Arc::new(PointCloudSnapshot::new(vec![Vec3::Z], Timestamp::zero()));
/// let mut scheduler = FitScheduler::new(Unit);
///
/// let submission = scheduler.submit(FitRequest::new(cloud, 0, FeatureType::Sphere)).unwrap();
/// assert!(matches!(submission, Submission::Accepted(_)));
///
/// let outcome = scheduler.wait().unwrap();
/// assert_eq!(outcome.result.unwrap().unwrap().feature_type(), FeatureType::Sphere);
/// ```
pub struct FitScheduler<F> {
    fitter: Arc<Mutex<F>>,
    in_flight: Option<InFlight>,
    next_id: FitId,
    thread_name: String,
}

impl<F: SurfaceFitter + 'static> FitScheduler<F> {
    /// Creates an idle scheduler owning `fitter`.
    #[must_use]
    pub fn new(fitter: F) -> Self {
        Self {
            fitter: Arc::new(Mutex::new(fitter)),
            in_flight: None,
            next_id: 1,
            thread_name: DEFAULT_FIT_THREAD_NAME.to_owned(),
        }
    }

    /// Set the worker thread name.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Returns true while a fit is running or its outcome is uncollected.
    #[must_use]
    pub fn is_busy(&mut self) -> bool {
        self.reap_cancelled();
        self.in_flight.is_some()
    }

    /// Returns true once the in-flight fit has finished and can be collected
    /// without blocking.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|f| !f.cancelled && f.handle.is_finished())
    }

    /// Starts a fit unless one is already in flight.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InvalidArgument`] if the seed index is outside
    /// the cloud, the seed radius is not positive, or the parameters are
    /// invalid. Returns [`FitError::Spawn`] if the worker thread cannot be
    /// started.
    pub fn submit(&mut self, request: FitRequest) -> crate::Result<Submission> {
        request.validate()?;

        if self.is_busy() {
            debug!(feature = %request.feature, "Fit in flight, dropping request");
            return Ok(Submission::Dropped);
        }

        let id = self.next_id;
        let FitRequest {
            feature,
            seed_index,
            seed_radius,
            params,
            cloud,
        } = request;
        let timestamp = cloud.timestamp;
        let fitter = Arc::clone(&self.fitter);

        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || {
                let mut fitter = fitter.lock();
                fitter.apply_params(&params);
                fitter.set_point_cloud(cloud.as_flat())?;
                fitter.find_surface(feature, seed_index, seed_radius)
            })?;

        self.next_id += 1;
        self.in_flight = Some(InFlight {
            id,
            feature,
            seed_index,
            timestamp,
            cancelled: false,
            handle,
        });
        debug!(id, %feature, seed_index, seed_radius, "Fit started");

        Ok(Submission::Accepted(id))
    }

    /// Collects the finished fit without blocking.
    ///
    /// Returns `None` while the fit is still running, when nothing is in
    /// flight, or when the finished fit had been cancelled. Each outcome is
    /// returned once.
    pub fn poll(&mut self) -> Option<FitOutcome> {
        if !self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.handle.is_finished())
        {
            return None;
        }
        self.in_flight.take().and_then(InFlight::join)
    }

    /// Blocks until the in-flight fit finishes and collects it.
    ///
    /// Returns `None` when nothing is in flight or the fit was cancelled.
    pub fn wait(&mut self) -> Option<FitOutcome> {
        self.in_flight.take().and_then(InFlight::join)
    }

    /// Marks the in-flight fit so its outcome is discarded.
    ///
    /// The worker cannot be interrupted; the scheduler stays busy until it
    /// returns. Returns false if nothing was in flight or it was already
    /// cancelled.
    pub fn cancel(&mut self) -> bool {
        match &mut self.in_flight {
            Some(f) if !f.cancelled => {
                f.cancelled = true;
                debug!(id = f.id, "Fit cancelled");
                true
            }
            _ => false,
        }
    }

    /// Runs `f` with exclusive access to the fitter.
    ///
    /// Blocks while a fit is running.
    pub fn with_fitter<R>(&self, f: impl FnOnce(&mut F) -> R) -> R {
        f(&mut self.fitter.lock())
    }

    fn reap_cancelled(&mut self) {
        if !self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.cancelled && f.handle.is_finished())
        {
            return;
        }
        // Cancelled outcomes are always discarded
        if let Some(InFlight { id, handle, .. }) = self.in_flight.take() {
            if handle.join().is_err() {
                error!(id, "Cancelled fit worker panicked");
            }
            debug!(id, "Discarding cancelled fit");
        }
    }
}

impl<F> Drop for FitScheduler<F> {
    fn drop(&mut self) {
        if let Some(f) = self.in_flight.take() {
            // The worker owns its own handle on the fitter; let it finish detached
            debug!(id = f.id, "Detaching fit worker on drop");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[derive(Default)]
    struct Recording {
        params: Option<FitParams>,
        point_floats: usize,
        calls: Vec<(FeatureType, usize, f32)>,
    }

    impl SurfaceFitter for Recording {
        fn apply_params(&mut self, params: &FitParams) {
            self.params = Some(*params);
        }

        fn set_point_cloud(&mut self, points: &[f32]) -> crate::Result<()> {
            self.point_floats = points.len();
            Ok(())
        }

        fn find_surface(
            &mut self,
            feature: FeatureType,
            seed_index: usize,
            seed_radius: f32,
        ) -> crate::Result<Option<FittedSurface>> {
            self.calls.push((feature, seed_index, seed_radius));
            Ok(None)
        }
    }

    fn cloud(n: usize) -> Arc<PointCloudSnapshot> {
        let points = (0..n).map(|i| Vec3::new(0.0, 0.0, 1.0 + i as f32)).collect();
        Arc::new(PointCloudSnapshot::new(points, Timestamp::from_ticks(7)))
    }

    #[test]
    fn fitter_sees_request_in_order() {
        let mut scheduler = FitScheduler::new(Recording::default());
        let request = FitRequest::at_distance(
            cloud(4),
            2,
            FeatureType::Plane,
            SeedRadius::LARGE,
            2.0,
            ErrorLevel::Normal,
        );

        assert_eq!(scheduler.submit(request).unwrap(), Submission::Accepted(1));
        let outcome = scheduler.wait().unwrap();
        assert_eq!(outcome.id, 1);
        assert_eq!(outcome.seed_index, 2);
        assert_eq!(outcome.timestamp, Timestamp::from_ticks(7));
        assert!(outcome.result.unwrap().is_none());

        scheduler.with_fitter(|f| {
            assert_eq!(f.point_floats, 12);
            assert_eq!(f.calls.len(), 1);
            assert_eq!(f.calls[0].0, FeatureType::Plane);
            assert!((f.calls[0].2 - 0.4).abs() < 1e-6);
            assert_eq!(f.params, Some(FitParams::for_distance(2.0, ErrorLevel::Normal)));
        });
        assert!(!scheduler.is_busy());
    }

    #[test]
    fn rejects_seed_outside_cloud() {
        let mut scheduler = FitScheduler::new(Recording::default());
        let err = scheduler
            .submit(FitRequest::new(cloud(3), 3, FeatureType::Any))
            .unwrap_err();
        assert!(err.to_string().contains("seed index 3"));
        assert!(!scheduler.is_busy());
    }

    #[test]
    fn rejects_bad_radius_and_params() {
        let mut scheduler = FitScheduler::new(Recording::default());
        let zero_radius = FitRequest::new(cloud(1), 0, FeatureType::Any).seed_radius(0.0);
        assert!(matches!(
            scheduler.submit(zero_radius),
            Err(FitError::InvalidArgument(_))
        ));

        let bad_params = FitRequest::new(cloud(1), 0, FeatureType::Any)
            .params(FitParams::default().mean_distance(-1.0));
        assert!(matches!(
            scheduler.submit(bad_params),
            Err(FitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn idle_scheduler_has_nothing() {
        let mut scheduler = FitScheduler::new(Recording::default());
        assert!(scheduler.poll().is_none());
        assert!(scheduler.wait().is_none());
        assert!(!scheduler.cancel());
        assert!(!scheduler.is_ready());
    }

    #[test]
    fn submission_accessors() {
        assert!(Submission::Accepted(3).is_accepted());
        assert!(!Submission::Dropped.is_accepted());
    }
}
