//! Raw depth frame types.
//!
//! Provides the frame shape delivered by time-of-flight depth sensors: one
//! unsigned millimetre sample per pixel plus an optional per-pixel
//! invalidation mask.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Timestamp;
use crate::error::{Result, SensorError};

/// Mask bit marking a pixel invalid regardless of its depth sample.
pub const INVALID_MASK_BIT: u8 = 0x80;

/// Millimetre to metre conversion factor applied during unprojection.
pub const MM_TO_M: f32 = 0.001;

/// Frame size in pixels.
///
/// A change in resolution is what forces the per-pixel unprojection table to
/// be rebuilt.
///
/// # Example
///
/// ```
/// use depth_types::Resolution;
///
/// let res = Resolution::new(320, 288);
/// assert_eq!(res.pixel_count(), 320 * 288);
/// assert_eq!(res.to_string(), "320x288");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Creates a new resolution.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the total number of pixels.
    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns true if either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the row-major index of pixel `(u, v)`.
    ///
    /// Returns `None` if the pixel is out of bounds.
    #[must_use]
    pub const fn index_of(self, u: u32, v: u32) -> Option<usize> {
        if u >= self.width || v >= self.height {
            return None;
        }
        Some(v as usize * self.width as usize + u as usize)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A raw frame from a depth sensor.
///
/// # Depth Values
///
/// - One `u16` sample per pixel, in millimetres along the optical axis ray
/// - `0` marks an invalid pixel
/// - If `mask` is present, a pixel whose mask byte has [`INVALID_MASK_BIT`]
///   set is treated as depth `0`
/// - Buffers are row-major: `depth[v * width + u]`
///
/// # Example
///
/// ```
/// use depth_types::{RawDepthFrame, Resolution, Timestamp, INVALID_MASK_BIT};
///
/// let frame = RawDepthFrame::new(Resolution::new(3, 1), vec![500, 600, 700], Timestamp::zero())
///     .with_mask(vec![0, INVALID_MASK_BIT, 0]);
///
/// assert_eq!(frame.effective_depth(1), 0);
/// assert_eq!(frame.valid_pixel_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawDepthFrame {
    /// Frame size in pixels.
    pub resolution: Resolution,

    /// Per-pixel depth samples in millimetres.
    pub depth: Vec<u16>,

    /// Optional per-pixel invalidation mask.
    pub mask: Option<Vec<u8>>,

    /// Capture time on the sensor clock.
    pub timestamp: Timestamp,
}

impl RawDepthFrame {
    /// Creates a frame without an invalidation mask.
    #[must_use]
    pub const fn new(resolution: Resolution, depth: Vec<u16>, timestamp: Timestamp) -> Self {
        Self {
            resolution,
            depth,
            mask: None,
            timestamp,
        }
    }

    /// Attaches an invalidation mask.
    #[must_use]
    pub fn with_mask(mut self, mask: Vec<u8>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Returns the total number of pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.resolution.pixel_count()
    }

    /// Returns the number of leading pixels present in every buffer.
    ///
    /// Pixels past a short depth or mask buffer are never valid.
    #[must_use]
    pub fn covered_pixels(&self) -> usize {
        self.pixel_count()
            .min(self.depth.len())
            .min(self.mask.as_ref().map_or(usize::MAX, Vec::len))
    }

    /// Returns true if the mask marks pixel `index` invalid.
    #[must_use]
    pub fn is_masked(&self, index: usize) -> bool {
        self.mask
            .as_deref()
            .and_then(|mask| mask.get(index))
            .is_some_and(|&bits| bits & INVALID_MASK_BIT != 0)
    }

    /// Returns the depth sample at `index` after applying the mask.
    ///
    /// Masked and uncovered pixels read as `0`.
    #[must_use]
    pub fn effective_depth(&self, index: usize) -> u16 {
        if index >= self.covered_pixels() || self.is_masked(index) {
            return 0;
        }
        self.depth[index]
    }

    /// Counts pixels with a nonzero effective depth.
    #[must_use]
    pub fn valid_pixel_count(&self) -> usize {
        (0..self.covered_pixels())
            .filter(|&i| self.effective_depth(i) != 0)
            .count()
    }

    /// Returns the fraction of pixels with valid depth (0.0 to 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn valid_fraction(&self) -> f32 {
        let total = self.pixel_count();
        if total == 0 {
            return 0.0;
        }
        self.valid_pixel_count() as f32 / total as f32
    }

    /// Validates that the buffers cover every pixel of the resolution.
    ///
    /// Unprojection does not call this; drivers that cannot guarantee buffer
    /// sizing should check frames before handing them over.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::EmptyResolution`] for a zero dimension, or
    /// [`SensorError::BufferSizeMismatch`] if the depth or mask buffer is
    /// shorter than `width * height`.
    pub fn check_buffers(&self) -> Result<()> {
        if self.resolution.is_empty() {
            return Err(SensorError::empty_resolution(
                self.resolution.width,
                self.resolution.height,
            ));
        }

        let expected = self.pixel_count();
        if self.depth.len() < expected {
            return Err(SensorError::buffer_mismatch(
                "depth",
                expected,
                self.depth.len(),
            ));
        }
        if let Some(mask) = &self.mask {
            if mask.len() < expected {
                return Err(SensorError::buffer_mismatch("mask", expected, mask.len()));
            }
        }
        Ok(())
    }

    /// Returns raw depth statistics (millimetres) over valid pixels.
    ///
    /// Returns `None` if there are no valid pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn depth_stats(&self) -> Option<DepthStats> {
        let mut min = u16::MAX;
        let mut max = 0u16;
        let mut sum = 0u64;
        let mut count = 0usize;

        for i in 0..self.covered_pixels() {
            let d = self.effective_depth(i);
            if d == 0 {
                continue;
            }
            min = min.min(d);
            max = max.max(d);
            sum += u64::from(d);
            count += 1;
        }

        if count == 0 {
            return None;
        }

        Some(DepthStats {
            min_mm: min,
            max_mm: max,
            mean_mm: sum as f32 / count as f32,
            valid_count: count,
        })
    }
}

/// Statistics for valid depth samples.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DepthStats {
    /// Minimum valid depth in millimetres.
    pub min_mm: u16,
    /// Maximum valid depth in millimetres.
    pub max_mm: u16,
    /// Mean valid depth in millimetres.
    pub mean_mm: f32,
    /// Number of valid pixels.
    pub valid_count: usize,
}
