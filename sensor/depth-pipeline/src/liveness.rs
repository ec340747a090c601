//! Consumer-side detection of a stalled capture thread.

use serde::{Deserialize, Serialize};

/// Liveness of the depth stream as seen by the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Liveness {
    /// A new snapshot arrived this tick.
    Fresh,
    /// No snapshot yet, but still within the threshold.
    Waiting {
        /// Consecutive ticks without a snapshot.
        idle_ticks: u32,
    },
    /// No snapshot for longer than the threshold.
    Stale {
        /// Consecutive ticks without a snapshot.
        idle_ticks: u32,
    },
}

impl Liveness {
    /// Returns true for [`Liveness::Stale`].
    #[must_use]
    pub const fn is_stale(self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// Counts consumer ticks without a new snapshot.
///
/// # Example
///
/// ```
/// use depth_pipeline::{Liveness, StalenessMonitor};
///
/// let mut monitor = StalenessMonitor::new(2);
/// assert_eq!(monitor.observe(true), Liveness::Fresh);
/// assert_eq!(monitor.observe(false), Liveness::Waiting { idle_ticks: 1 });
/// assert_eq!(monitor.observe(false), Liveness::Waiting { idle_ticks: 2 });
/// assert!(monitor.observe(false).is_stale());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessMonitor {
    threshold: u32,
    idle_ticks: u32,
    warned: bool,
}

impl StalenessMonitor {
    /// Creates a monitor that reports `Stale` after more than `threshold`
    /// idle ticks.
    #[must_use]
    pub const fn new(threshold: u32) -> Self {
        Self {
            threshold,
            idle_ticks: 0,
            warned: false,
        }
    }

    /// Returns the threshold in ticks.
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Records one consumer tick.
    ///
    /// `updated` is whether a snapshot was taken this tick.
    pub fn observe(&mut self, updated: bool) -> Liveness {
        if updated {
            if self.warned {
                tracing::info!(idle_ticks = self.idle_ticks, "Depth stream resumed");
            }
            self.reset();
            return Liveness::Fresh;
        }

        self.idle_ticks = self.idle_ticks.saturating_add(1);
        if self.idle_ticks <= self.threshold {
            return Liveness::Waiting {
                idle_ticks: self.idle_ticks,
            };
        }

        if !self.warned {
            tracing::warn!(
                idle_ticks = self.idle_ticks,
                threshold = self.threshold,
                "Depth stream stale"
            );
            self.warned = true;
        }
        Liveness::Stale {
            idle_ticks: self.idle_ticks,
        }
    }

    /// Returns the liveness as of the last observed tick, without recording
    /// a new one.
    #[must_use]
    pub const fn status(&self) -> Liveness {
        if self.idle_ticks == 0 {
            Liveness::Fresh
        } else if self.idle_ticks <= self.threshold {
            Liveness::Waiting {
                idle_ticks: self.idle_ticks,
            }
        } else {
            Liveness::Stale {
                idle_ticks: self.idle_ticks,
            }
        }
    }

    /// Clears the idle count.
    pub fn reset(&mut self) {
        self.idle_ticks = 0;
        self.warned = false;
    }
}
