//! Error types for depth sensor data.

use thiserror::Error;

/// Errors that can occur when validating depth sensor data.
#[derive(Debug, Error)]
pub enum SensorError {
    /// Buffer size mismatch (e.g., depth buffer shorter than the resolution).
    #[error("{buffer} buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch {
        /// Which buffer was checked.
        buffer: &'static str,
        /// Expected buffer size.
        expected: usize,
        /// Actual buffer size.
        actual: usize,
    },

    /// Resolution with a zero dimension.
    #[error("empty resolution: {width}x{height}")]
    EmptyResolution {
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
    },
}

impl SensorError {
    /// Creates a buffer size mismatch error.
    #[must_use]
    pub const fn buffer_mismatch(buffer: &'static str, expected: usize, actual: usize) -> Self {
        Self::BufferSizeMismatch {
            buffer,
            expected,
            actual,
        }
    }

    /// Creates an empty resolution error.
    #[must_use]
    pub const fn empty_resolution(width: u32, height: u32) -> Self {
        Self::EmptyResolution { width, height }
    }
}

/// Result type for depth sensor data validation.
pub type Result<T> = std::result::Result<T, SensorError>;
