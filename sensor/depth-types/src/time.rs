//! Time types for depth frames.
//!
//! Depth sensors stamp frames with a monotonic host clock counted in
//! 100-nanosecond ticks. The same unit is used to look up the device pose.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sensor clock ticks per second (one tick is 100 ns).
pub const TICKS_PER_SECOND: u64 = 10_000_000;

const NANOS_PER_TICK: u64 = 100;

/// Monotonic sensor-clock timestamp.
///
/// # Example
///
/// ```
/// use depth_types::Timestamp;
///
/// let ts = Timestamp::from_secs_f64(1.5);
/// assert_eq!(ts.as_ticks(), 15_000_000);
/// assert_eq!(ts.as_nanos(), 1_500_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp {
    ticks: u64,
}

impl Timestamp {
    /// Creates a timestamp from sensor clock ticks.
    #[must_use]
    pub const fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Creates a timestamp from nanoseconds, truncated to whole ticks.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self {
            ticks: nanos / NANOS_PER_TICK,
        }
    }

    /// Creates a timestamp from seconds (floating point).
    ///
    /// Negative values clamp to zero.
    #[must_use]
    #[allow(
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss
    )]
    pub fn from_secs_f64(secs: f64) -> Self {
        let ticks = (secs * TICKS_PER_SECOND as f64).round().max(0.0) as u64;
        Self { ticks }
    }

    /// Returns the timestamp as sensor clock ticks.
    #[must_use]
    pub const fn as_ticks(self) -> u64 {
        self.ticks
    }

    /// Returns the timestamp as nanoseconds (saturating).
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.ticks.saturating_mul(NANOS_PER_TICK)
    }

    /// Returns the timestamp as seconds (floating point).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.ticks as f64 / TICKS_PER_SECOND as f64
    }

    /// Returns the zero timestamp.
    #[must_use]
    pub const fn zero() -> Self {
        Self { ticks: 0 }
    }

    /// Checks if this is the zero timestamp.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.ticks == 0
    }

    /// Adds a duration to this timestamp.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, duration: Duration) -> Option<Self> {
        match self.ticks.checked_add(duration.as_ticks()) {
            Some(ticks) => Some(Self { ticks }),
            None => None,
        }
    }

    /// Subtracts a duration from this timestamp.
    ///
    /// Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, duration: Duration) -> Option<Self> {
        match self.ticks.checked_sub(duration.as_ticks()) {
            Some(ticks) => Some(Self { ticks }),
            None => None,
        }
    }

    /// Returns the absolute duration between two timestamps.
    #[must_use]
    pub const fn abs_diff(self, other: Self) -> Duration {
        Duration::from_ticks(self.ticks.abs_diff(other.ticks))
    }
}

/// A span of sensor clock time.
///
/// # Example
///
/// ```
/// use depth_types::Duration;
///
/// let d = Duration::from_millis(100);
/// assert_eq!(d.as_ticks(), 1_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Duration {
    ticks: u64,
}

impl Duration {
    /// Creates a duration from sensor clock ticks.
    #[must_use]
    pub const fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Creates a duration from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            ticks: millis * (TICKS_PER_SECOND / 1_000),
        }
    }

    /// Creates a duration from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            ticks: secs * TICKS_PER_SECOND,
        }
    }

    /// Returns the duration as sensor clock ticks.
    #[must_use]
    pub const fn as_ticks(self) -> u64 {
        self.ticks
    }

    /// Returns the duration as whole milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.ticks / (TICKS_PER_SECOND / 1_000)
    }

    /// Returns the duration as seconds (floating point).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.ticks as f64 / TICKS_PER_SECOND as f64
    }

    /// Returns the zero duration.
    #[must_use]
    pub const fn zero() -> Self {
        Self { ticks: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_from_secs_f64() {
        let ts = Timestamp::from_secs_f64(1.5);
        assert_eq!(ts.as_ticks(), 15_000_000);
        assert!((ts.as_secs_f64() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn timestamp_negative_secs_clamps() {
        assert!(Timestamp::from_secs_f64(-3.0).is_zero());
    }

    #[test]
    fn timestamp_nanos_truncate_to_ticks() {
        let ts = Timestamp::from_nanos(1_234);
        assert_eq!(ts.as_ticks(), 12);
        assert_eq!(ts.as_nanos(), 1_200);
    }

    #[test]
    fn timestamp_checked_ops() {
        let ts = Timestamp::from_ticks(1000);
        let d = Duration::from_ticks(500);

        assert_eq!(ts.checked_add(d), Some(Timestamp::from_ticks(1500)));
        assert_eq!(ts.checked_sub(d), Some(Timestamp::from_ticks(500)));
        assert_eq!(ts.checked_sub(Duration::from_ticks(2000)), None);
    }

    #[test]
    fn timestamp_abs_diff() {
        let a = Timestamp::from_ticks(1000);
        let b = Timestamp::from_ticks(300);

        assert_eq!(a.abs_diff(b), Duration::from_ticks(700));
        assert_eq!(b.abs_diff(a), Duration::from_ticks(700));
    }

    #[test]
    fn duration_conversions() {
        let d = Duration::from_millis(1500);
        assert_eq!(d.as_ticks(), 15_000_000);
        assert_eq!(d.as_millis(), 1500);
        assert!((d.as_secs_f64() - 1.5).abs() < 1e-9);
        assert_eq!(Duration::from_secs(2).as_millis(), 2000);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn timestamp_serialization() {
        let ts = Timestamp::from_ticks(1_500);
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ts);
    }
}
