//! Hardware-agnostic depth sensor types.
//!
//! This crate provides the foundational types shared by the depth capture
//! pipeline and the surface-fit contract:
//! - Real depth sensor drivers (time-of-flight, structured light)
//! - The capture thread that unprojects frames into point clouds
//! - Consumers that pick points and seed surface fitting
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no threading and no driver dependencies. It
//! can be used in:
//! - Sensor drivers
//! - Offline tools replaying recorded frames
//! - Tests with synthetic frames
//!
//! # Types
//!
//! - [`Resolution`] - Frame size in pixels
//! - [`RawDepthFrame`] - Raw depth samples in millimetres with an optional
//!   invalidation mask
//! - [`PointCloudSnapshot`] - Camera-space points (metres) with the timestamp
//!   of the frame they came from
//! - [`Timestamp`] / [`Duration`] - Sensor clock ticks (100 ns)
//!
//! # Example
//!
//! ```
//! use depth_types::{RawDepthFrame, Resolution, Timestamp};
//!
//! let frame = RawDepthFrame::new(
//!     Resolution::new(4, 1),
//!     vec![0, 1000, 1200, 0],
//!     Timestamp::from_ticks(42),
//! );
//!
//! assert_eq!(frame.valid_pixel_count(), 2);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cloud;
mod depth;
mod error;
mod time;

pub use cloud::PointCloudSnapshot;
pub use depth::{DepthStats, INVALID_MASK_BIT, MM_TO_M, RawDepthFrame, Resolution};
pub use error::{Result, SensorError};
pub use time::{Duration, TICKS_PER_SECOND, Timestamp};

/// Camera-space point in metres.
pub type Point3 = glam::Vec3;
