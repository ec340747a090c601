//! Depth capture pipeline.
//!
//! Turns raw frames from a depth sensor into camera-space point clouds on a
//! background thread, hands the newest cloud to a consumer running at its
//! own rate, places it in the world and picks the point a ray is aimed at.
//!
//! # Capture
//!
//! - [`DepthSensor`] - Driver interface (stream control, frame wait, intrinsics)
//! - [`IntrinsicsCache`] - Per-pixel unprojection table, rebuilt on resolution change
//! - [`unproject`] - Depth frame to camera-space points
//! - [`CaptureWorker`] / [`CaptureState`] - The capture thread's payload and lifecycle
//! - [`SnapshotStore`] - Latest-wins hand-off between producer and consumer
//!
//! # Placement and Picking
//!
//! - [`Transform3D`] - Rigid body transform (rotation + translation)
//! - [`FrameComposer`] / [`camera_to_world`] - Camera to rig to world
//! - [`SpatialTracker`] / [`PoseTrack`] - Rig pose lookup by timestamp
//! - [`pick`] / [`Ray`] - Point selection along a world-space ray
//!
//! # Consumer API
//!
//! - [`DepthPipeline`] - Owns the sensor and capture thread
//! - [`StalenessMonitor`] - Detects a stalled stream from the consumer side
//!
//! # Example
//!
//! ```
//! use depth_pipeline::{pick, IntrinsicsCache, Ray, Transform3D, unproject};
//! use depth_types::{RawDepthFrame, Resolution, Timestamp};
//! use glam::{Vec2, Vec3};
//!
//! let frame = RawDepthFrame::new(Resolution::new(2, 1), vec![1000, 2000], Timestamp::zero());
//! let mut cache = IntrinsicsCache::new();
//! let points = unproject(&frame, cache.ensure(frame.resolution, |_| Vec2::ZERO));
//!
//! let ray = Ray::new(Vec3::ZERO, Vec3::Z);
//! assert_eq!(pick(&ray, &points, &Transform3D::identity(), 0.015), Some(0));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod buffer;
mod capture;
mod compose;
mod config;
mod error;
mod intrinsics;
mod liveness;
mod pick;
mod pipeline;
mod pose_track;
mod sensor;
mod snapshot;
mod transform;
mod unproject;

// Re-export capture types
pub use capture::{CaptureState, CaptureWorker};
pub use intrinsics::{IntrinsicsCache, UnprojectionEntry};
pub use sensor::DepthSensor;
pub use snapshot::{SnapshotStore, StoreStats};
pub use unproject::unproject;

// Re-export placement and picking types
pub use buffer::StreamBuffer;
pub use compose::{FrameComposer, SpatialTracker, camera_to_world};
pub use pick::{DEFAULT_PROBE_RADIUS, Ray, pick};
pub use pose_track::{DEFAULT_POSE_CAPACITY, PoseTrack};
pub use transform::Transform3D;

// Re-export consumer types
pub use config::{DEFAULT_STALE_AFTER_TICKS, DEFAULT_THREAD_NAME, PipelineConfig};
pub use liveness::{Liveness, StalenessMonitor};
pub use pipeline::DepthPipeline;

// Re-export error types
pub use error::{CaptureError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        CaptureError, CaptureState, DepthPipeline, DepthSensor, Liveness, PipelineConfig,
        PoseTrack, Ray, SpatialTracker, StalenessMonitor, Transform3D, pick,
    };
}
