//! Configuration for the depth pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, Result};
use crate::pick::DEFAULT_PROBE_RADIUS;

/// Default name of the capture thread.
pub const DEFAULT_THREAD_NAME: &str = "depth-capture";

/// Default number of idle consumer ticks before the stream counts as stale.
pub const DEFAULT_STALE_AFTER_TICKS: u32 = 90;

/// Configuration for [`DepthPipeline`](crate::DepthPipeline).
///
/// # Example
///
/// ```
/// use depth_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert!((config.probe_radius - 0.015).abs() < 1e-6);
/// assert_eq!(config.thread_name, "depth-capture");
///
/// // Wider probe for coarse targeting
/// let coarse = PipelineConfig::coarse_targeting();
/// assert!(coarse.probe_radius > config.probe_radius);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Radius of the picking cone at one metre along the ray.
    pub probe_radius: f32,

    /// Name given to the capture thread.
    pub thread_name: String,

    /// Idle consumer ticks tolerated before reporting a stale stream.
    pub stale_after_ticks: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            probe_radius: DEFAULT_PROBE_RADIUS,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            stale_after_ticks: DEFAULT_STALE_AFTER_TICKS,
        }
    }
}

impl PipelineConfig {
    /// Configuration with a wide probe for coarse gaze or controller rays.
    #[must_use]
    pub fn coarse_targeting() -> Self {
        Self {
            probe_radius: 0.05,
            ..Self::default()
        }
    }

    /// Set the probe radius.
    #[must_use]
    pub const fn probe_radius(mut self, radius: f32) -> Self {
        self.probe_radius = radius;
        self
    }

    /// Set the capture thread name.
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set the staleness threshold in consumer ticks.
    #[must_use]
    pub const fn stale_after_ticks(mut self, ticks: u32) -> Self {
        self.stale_after_ticks = ticks;
        self
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::InvalidConfig`] if the probe radius is
    /// negative or not finite, or the thread name is empty or contains a
    /// NUL byte.
    pub fn validate(&self) -> Result<()> {
        if !self.probe_radius.is_finite() || self.probe_radius < 0.0 {
            return Err(CaptureError::invalid_config(format!(
                "probe radius must be finite and non-negative, got {}",
                self.probe_radius
            )));
        }
        if self.thread_name.is_empty() || self.thread_name.contains('\0') {
            return Err(CaptureError::invalid_config(
                "thread name must be non-empty and free of NUL bytes",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stale_after_ticks, 90);
    }

    #[test]
    fn builders() {
        let config = PipelineConfig::default()
            .probe_radius(0.03)
            .thread_name("tof-capture")
            .stale_after_ticks(10);
        assert!((config.probe_radius - 0.03).abs() < 1e-6);
        assert_eq!(config.thread_name, "tof-capture");
        assert_eq!(config.stale_after_ticks, 10);
    }

    #[test]
    fn rejects_bad_radius() {
        assert!(PipelineConfig::default().probe_radius(-0.1).validate().is_err());
        assert!(
            PipelineConfig::default()
                .probe_radius(f32::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn rejects_bad_thread_name() {
        assert!(PipelineConfig::default().thread_name("").validate().is_err());
        assert!(PipelineConfig::default().thread_name("a\0b").validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"probe_radius": 0.02}"#).unwrap();
        assert!((config.probe_radius - 0.02).abs() < 1e-6);
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
        assert_eq!(config.stale_after_ticks, DEFAULT_STALE_AFTER_TICKS);
    }

    #[test]
    fn json_round_trip() {
        let config = PipelineConfig::coarse_targeting().thread_name("x");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
