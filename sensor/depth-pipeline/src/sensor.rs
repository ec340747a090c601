//! Depth sensor driver interface.

use depth_types::RawDepthFrame;
use glam::{Mat4, Vec2};

use crate::error::Result;

/// A depth sensor driver.
///
/// The driver is moved onto the capture thread while the pipeline runs and
/// handed back when it stops, so it only needs to be [`Send`].
pub trait DepthSensor: Send + 'static {
    /// Opens the frame stream.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::StreamOpen`](crate::CaptureError::StreamOpen)
    /// if the sensor cannot start streaming (for example, access was denied).
    fn open_stream(&mut self) -> Result<()>;

    /// Closes the frame stream.
    fn close_stream(&mut self);

    /// Blocks until the next frame is available.
    ///
    /// The driver owns the wait; the capture loop applies no timeout of its
    /// own. Returns `None` if the wait ended without a frame, which the loop
    /// treats as a spurious wake-up.
    fn next_frame(&mut self) -> Option<RawDepthFrame>;

    /// Maps a pixel position to the camera's `z = 1` plane.
    fn map_image_point_to_unit_plane(&self, uv: Vec2) -> Vec2;

    /// Returns the fixed rig-to-camera transform as a column-vector matrix.
    fn extrinsics(&self) -> Mat4;
}
