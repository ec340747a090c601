//! Error types for the depth pipeline.

use thiserror::Error;

/// Errors that can occur while setting up or running depth capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The sensor driver could not open its frame stream.
    #[error("failed to open depth stream: {0}")]
    StreamOpen(String),

    /// The capture thread could not be spawned.
    #[error("failed to spawn capture thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The sensor was lost because the capture thread panicked.
    #[error("depth sensor lost: capture thread terminated abnormally")]
    SensorLost,

    /// The driver reported extrinsics that cannot be inverted.
    #[error("extrinsics are not invertible (determinant {determinant})")]
    SingularExtrinsics {
        /// Determinant of the reported matrix.
        determinant: f32,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CaptureError {
    /// Creates a stream open error.
    #[must_use]
    pub fn stream_open(reason: impl Into<String>) -> Self {
        Self::StreamOpen(reason.into())
    }

    /// Creates a singular extrinsics error.
    #[must_use]
    pub const fn singular_extrinsics(determinant: f32) -> Self {
        Self::SingularExtrinsics { determinant }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Result type for depth pipeline operations.
pub type Result<T> = std::result::Result<T, CaptureError>;
