//! Consumer-facing depth pipeline.

use std::mem;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};

use depth_types::{PointCloudSnapshot, Timestamp};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::capture::{CaptureState, CaptureWorker, LoopContext};
use crate::compose::{FrameComposer, SpatialTracker};
use crate::config::PipelineConfig;
use crate::liveness::{Liveness, StalenessMonitor};
use crate::error::{CaptureError, Result};
use crate::pick::{Ray, pick};
use crate::sensor::DepthSensor;
use crate::snapshot::StoreStats;
use crate::transform::Transform3D;

enum WorkerSlot<S> {
    Parked(CaptureWorker<S>),
    Running(JoinHandle<Option<CaptureWorker<S>>>),
    Lost,
}

/// Depth capture and point picking for one sensor.
///
/// The pipeline owns a background capture thread that keeps the newest
/// point cloud available. A consumer running at its own rate takes the
/// newest cloud, places it in the world and picks the point a ray is aimed
/// at.
///
/// Dropping the pipeline stops the capture thread, which may wait for the
/// driver's current frame wait to return.
///
/// # Example
///
/// ```no_run
/// # use depth_pipeline::{DepthPipeline, DepthSensor, PipelineConfig, PoseTrack, Ray};
/// # use glam::Vec3;
/// # fn demo<S: DepthSensor>(sensor: S, poses: &PoseTrack) -> depth_pipeline::Result<()> {
/// let mut pipeline = DepthPipeline::new(sensor, PipelineConfig::default())?;
/// pipeline.start()?;
///
/// // Once per consumer tick
/// if let Some(cloud) = pipeline.latest_snapshot_if_any() {
///     if let Some(camera_to_world) = pipeline.camera_to_world(poses, cloud.timestamp) {
///         let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
///         let _picked = pipeline.pick(&ray, &cloud, &camera_to_world);
///     }
/// }
///
/// pipeline.stop();
/// # Ok(())
/// # }
/// ```
pub struct DepthPipeline<S: DepthSensor> {
    config: PipelineConfig,
    composer: FrameComposer,
    ctx: LoopContext,
    slot: WorkerSlot<S>,
    monitor: StalenessMonitor,
}

impl<S: DepthSensor> DepthPipeline<S> {
    /// Creates an idle pipeline for `sensor`.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::InvalidConfig`] for an unusable configuration,
    /// or [`CaptureError::SingularExtrinsics`] if the sensor's extrinsics
    /// cannot be inverted.
    pub fn new(sensor: S, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let composer = FrameComposer::from_extrinsics(sensor.extrinsics())?;
        let monitor = StalenessMonitor::new(config.stale_after_ticks);
        Ok(Self {
            config,
            composer,
            ctx: LoopContext::default(),
            slot: WorkerSlot::Parked(CaptureWorker::new(sensor)),
            monitor,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the frame composer built from the sensor extrinsics.
    #[must_use]
    pub const fn composer(&self) -> &FrameComposer {
        &self.composer
    }

    /// Starts the capture thread.
    ///
    /// Does nothing if the thread is already running. A thread that ended
    /// (after a failed open or a stop) is joined and its sensor reused.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Spawn`] if the thread cannot be created, or
    /// [`CaptureError::SensorLost`] if an earlier capture thread panicked.
    pub fn start(&mut self) -> Result<()> {
        let worker = match mem::replace(&mut self.slot, WorkerSlot::Lost) {
            WorkerSlot::Running(handle) if !handle.is_finished() => {
                self.slot = WorkerSlot::Running(handle);
                return Ok(());
            }
            WorkerSlot::Running(handle) => {
                if let Ok(Some(worker)) = handle.join() {
                    worker
                } else {
                    warn!("Depth capture thread panicked; sensor lost");
                    self.ctx.state.set(CaptureState::Idle);
                    return Err(CaptureError::SensorLost);
                }
            }
            WorkerSlot::Parked(worker) => worker,
            WorkerSlot::Lost => return Err(CaptureError::SensorLost),
        };

        self.ctx.stop.store(false, Ordering::Release);
        self.ctx.state.set(CaptureState::Opening);

        // Park the worker where a failed spawn can recover it
        let handoff = Arc::new(Mutex::new(Some(worker)));
        let thread_handoff = Arc::clone(&handoff);
        let ctx = self.ctx.clone();

        let spawned = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || {
                let worker = thread_handoff.lock().take()?;
                Some(worker.run(&ctx))
            });

        match spawned {
            Ok(handle) => {
                info!(thread = %self.config.thread_name, "Started depth capture thread");
                self.slot = WorkerSlot::Running(handle);
                self.monitor.reset();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Failed to spawn depth capture thread");
                self.ctx.state.set(CaptureState::Idle);
                if let Some(worker) = handoff.lock().take() {
                    self.slot = WorkerSlot::Parked(worker);
                }
                Err(CaptureError::Spawn(err))
            }
        }
    }

    /// Stops the capture thread and discards any unconsumed snapshot.
    ///
    /// Blocks until the thread's current frame wait returns. Does nothing
    /// if the pipeline is not running.
    pub fn stop(&mut self) {
        self.slot = match mem::replace(&mut self.slot, WorkerSlot::Lost) {
            WorkerSlot::Running(handle) => {
                self.ctx.stop.store(true, Ordering::Release);
                if let Ok(Some(worker)) = handle.join() {
                    WorkerSlot::Parked(worker)
                } else {
                    warn!("Depth capture thread panicked; sensor lost");
                    self.ctx.state.set(CaptureState::Idle);
                    WorkerSlot::Lost
                }
            }
            other => other,
        };
        self.ctx.store.clear();
    }

    /// Returns the current capture state.
    #[must_use]
    pub fn state(&self) -> CaptureState {
        self.ctx.state.get()
    }

    /// Returns true while the capture thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(&self.slot, WorkerSlot::Running(handle) if !handle.is_finished())
    }

    /// Takes the stream-open error recorded by the capture thread, if any.
    ///
    /// Each error is returned once.
    #[must_use]
    pub fn take_fatal_error(&self) -> Option<CaptureError> {
        self.ctx.fatal.lock().take()
    }

    /// Takes the newest point cloud if one arrived since the last call.
    ///
    /// Call once per consumer tick: each call also counts as one tick for
    /// [`liveness`](Self::liveness).
    #[must_use]
    pub fn latest_snapshot_if_any(&mut self) -> Option<PointCloudSnapshot> {
        let snapshot = self.ctx.store.take_if_updated();
        self.monitor.observe(snapshot.is_some());
        snapshot
    }

    /// Returns whether snapshots are still arriving, judged against
    /// [`PipelineConfig::stale_after_ticks`].
    #[must_use]
    pub const fn liveness(&self) -> Liveness {
        self.monitor.status()
    }

    /// Returns snapshot traffic counters.
    #[must_use]
    pub fn store_stats(&self) -> StoreStats {
        self.ctx.store.stats()
    }

    /// Returns the camera-to-world transform at `timestamp`.
    ///
    /// Returns `None` if the tracker cannot locate the rig; the consumer
    /// should skip picking for that tick.
    #[must_use]
    pub fn camera_to_world<T>(&self, tracker: &T, timestamp: Timestamp) -> Option<Transform3D>
    where
        T: SpatialTracker + ?Sized,
    {
        self.composer.camera_to_world_at(tracker, timestamp)
    }

    /// Picks the snapshot point a world-space ray is aimed at.
    #[must_use]
    pub fn pick(
        &self,
        ray: &Ray,
        snapshot: &PointCloudSnapshot,
        camera_to_world: &Transform3D,
    ) -> Option<usize> {
        pick(ray, &snapshot.points, camera_to_world, self.config.probe_radius)
    }
}

impl<S: DepthSensor> Drop for DepthPipeline<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
