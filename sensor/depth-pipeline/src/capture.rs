//! The depth capture loop.
//!
//! One dedicated thread opens the sensor stream, waits for frames,
//! unprojects them and publishes the result to the [`SnapshotStore`]. The
//! sensor and its unprojection table move into the thread on start and come
//! back out through the join handle on stop.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use depth_types::RawDepthFrame;
use glam::Vec3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CaptureError;
use crate::intrinsics::IntrinsicsCache;
use crate::sensor::DepthSensor;
use crate::snapshot::SnapshotStore;
use crate::unproject::unproject;

/// Lifecycle state of the capture thread.
///
/// Transitions run `Idle -> Opening -> Running -> Closing -> Idle`. A failed
/// open goes straight from `Opening` back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CaptureState {
    /// No capture thread is running.
    #[default]
    Idle = 0,
    /// The thread is opening the sensor stream.
    Opening = 1,
    /// Frames are being captured.
    Running = 2,
    /// The thread is closing the sensor stream.
    Closing = 3,
}

impl CaptureState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Opening,
            2 => Self::Running,
            3 => Self::Closing,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Opening => "opening",
            Self::Running => "running",
            Self::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// Atomically shared [`CaptureState`].
#[derive(Debug, Default)]
pub(crate) struct SharedState(AtomicU8);

impl SharedState {
    pub(crate) fn get(&self) -> CaptureState {
        CaptureState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: CaptureState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Returns the shared state to `Idle` when the capture loop exits, including
/// by unwinding out of a panicking driver call.
struct IdleOnExit<'a>(&'a SharedState);

impl Drop for IdleOnExit<'_> {
    fn drop(&mut self) {
        self.0.set(CaptureState::Idle);
    }
}

/// State shared between the pipeline owner and the capture thread.
#[derive(Debug, Clone, Default)]
pub(crate) struct LoopContext {
    pub(crate) store: Arc<SnapshotStore>,
    pub(crate) stop: Arc<AtomicBool>,
    pub(crate) state: Arc<SharedState>,
    pub(crate) fatal: Arc<Mutex<Option<CaptureError>>>,
}

/// A sensor together with the unprojection table built from it.
///
/// This is the unit of ownership handed to the capture thread.
#[derive(Debug)]
pub struct CaptureWorker<S> {
    sensor: S,
    cache: IntrinsicsCache,
    frames: u64,
}

impl<S: DepthSensor> CaptureWorker<S> {
    /// Creates a worker with an empty unprojection table.
    #[must_use]
    pub const fn new(sensor: S) -> Self {
        Self {
            sensor,
            cache: IntrinsicsCache::new(),
            frames: 0,
        }
    }

    /// Returns the sensor.
    #[must_use]
    pub const fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Returns the unprojection table cache.
    #[must_use]
    pub const fn intrinsics(&self) -> &IntrinsicsCache {
        &self.cache
    }

    /// Returns the number of frames processed over the worker's lifetime.
    #[must_use]
    pub const fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Consumes the worker and returns the sensor.
    #[must_use]
    pub fn into_sensor(self) -> S {
        self.sensor
    }

    /// Unprojects one frame, rebuilding the table if the resolution changed.
    pub fn process_frame(&mut self, frame: &RawDepthFrame) -> Vec<Vec3> {
        if !self.cache.is_current(frame.resolution) {
            info!(
                resolution = %frame.resolution,
                previous = ?self.cache.resolution(),
                "Depth resolution changed"
            );
        }
        let sensor = &self.sensor;
        let table = self
            .cache
            .ensure(frame.resolution, |uv| sensor.map_image_point_to_unit_plane(uv));
        self.frames += 1;
        unproject(frame, table)
    }

    /// Runs the capture loop until the stop flag is raised.
    ///
    /// Returns the worker so the owner can restart later.
    pub(crate) fn run(mut self, ctx: &LoopContext) -> Self {
        let _idle = IdleOnExit(ctx.state.as_ref());
        ctx.state.set(CaptureState::Opening);
        info!("Opening depth stream");

        if let Err(err) = self.sensor.open_stream() {
            warn!(error = %err, "Depth stream failed to open");
            *ctx.fatal.lock() = Some(err);
            return self;
        }

        ctx.state.set(CaptureState::Running);
        info!("Depth capture running");

        let start_frames = self.frames;
        while !ctx.stop.load(Ordering::Acquire) {
            let frame = self.sensor.next_frame();
            if ctx.stop.load(Ordering::Acquire) {
                break;
            }
            let Some(frame) = frame else {
                continue;
            };
            let points = self.process_frame(&frame);
            debug!(
                points = points.len(),
                timestamp = frame.timestamp.as_ticks(),
                "Publishing point cloud"
            );
            ctx.store.publish(points, frame.timestamp);
        }

        ctx.state.set(CaptureState::Closing);
        self.sensor.close_stream();
        info!(
            frames = self.frames - start_frames,
            "Depth capture stopped"
        );
        self
    }
}
