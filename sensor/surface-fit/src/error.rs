//! Error types for surface fitting.

use thiserror::Error;

/// Status codes reported by native surface fitting libraries.
///
/// Adapters wrapping such a library turn these into [`FitError`] values with
/// [`check_status`].
pub mod status {
    /// The call succeeded.
    pub const OK: i32 = 0;
    /// The library ran out of memory.
    pub const OUT_OF_MEMORY: i32 = -1;
    /// The call is not valid in the current state.
    pub const INVALID_OPERATION: i32 = -2;
    /// An argument was out of range.
    pub const INVALID_VALUE: i32 = -3;
    /// No surface was found around the seed.
    pub const NOT_FOUND: i32 = -100;
    /// A surface was found but rejected by the library's quality checks.
    pub const UNACCEPTABLE_RESULT: i32 = -101;
}

/// Errors that can occur while fitting a surface.
///
/// "No surface found" is not an error; fitters report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum FitError {
    /// An argument was out of range (seed index, radius, point count).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The call is not valid in the fitter's current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The fitter ran out of memory.
    #[error("surface fitter out of memory")]
    OutOfMemory,

    /// The fit worker thread could not be spawned.
    #[error("failed to spawn fit worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// The fit worker panicked before producing a result.
    #[error("fit worker terminated abnormally")]
    WorkerPanicked,
}

impl FitError {
    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(details: impl Into<String>) -> Self {
        Self::InvalidArgument(details.into())
    }

    /// Creates an invalid operation error.
    #[must_use]
    pub fn invalid_operation(details: impl Into<String>) -> Self {
        Self::InvalidOperation(details.into())
    }
}

/// Result type for surface fitting operations.
pub type Result<T> = std::result::Result<T, FitError>;

/// Interprets a native status code.
///
/// Returns `Ok(true)` on success and `Ok(false)` when no acceptable surface
/// was found.
///
/// # Errors
///
/// Returns the [`FitError`] matching an error code. Unknown negative codes
/// are reported as [`FitError::InvalidOperation`].
///
/// # Example
///
/// ```
/// use surface_fit::{check_status, status, FitError};
///
/// assert!(check_status(status::OK).unwrap());
/// assert!(!check_status(status::NOT_FOUND).unwrap());
/// assert!(matches!(check_status(status::OUT_OF_MEMORY), Err(FitError::OutOfMemory)));
/// ```
pub fn check_status(code: i32) -> Result<bool> {
    match code {
        status::OK => Ok(true),
        status::NOT_FOUND | status::UNACCEPTABLE_RESULT => Ok(false),
        status::OUT_OF_MEMORY => Err(FitError::OutOfMemory),
        status::INVALID_OPERATION => Err(FitError::invalid_operation("rejected by fitter")),
        status::INVALID_VALUE => Err(FitError::invalid_argument("rejected by fitter")),
        code if code > 0 => Ok(true),
        code => Err(FitError::invalid_operation(format!(
            "unknown status code {code}"
        ))),
    }
}
