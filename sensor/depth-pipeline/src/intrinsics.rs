//! Per-pixel unprojection table.
//!
//! The sensor driver knows how to map a pixel to the camera's unit plane
//! (`z = 1`). That mapping is expensive and only changes with resolution, so
//! it is evaluated once per pixel and cached.

use depth_types::Resolution;
use glam::Vec2;
use tracing::debug;

/// Cached unprojection data for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnprojectionEntry {
    /// Unit-plane x coordinate of the pixel centre.
    pub ray_x: f32,
    /// Unit-plane y coordinate of the pixel centre.
    pub ray_y: f32,
    /// Length of the unit-plane ray, `sqrt(1 + x² + y²)`.
    pub radial_scale: f32,
    /// Reciprocal of [`radial_scale`](Self::radial_scale).
    pub inverse_radial_scale: f32,
}

impl UnprojectionEntry {
    /// Builds an entry from a unit-plane point.
    #[must_use]
    pub fn from_unit_plane(xy: Vec2) -> Self {
        let radial_scale = (1.0 + xy.x * xy.x + xy.y * xy.y).sqrt();
        Self {
            ray_x: xy.x,
            ray_y: xy.y,
            radial_scale,
            inverse_radial_scale: 1.0 / radial_scale,
        }
    }
}

/// Lazily rebuilt table of [`UnprojectionEntry`] values, row-major.
///
/// # Example
///
/// ```
/// use depth_pipeline::IntrinsicsCache;
/// use depth_types::Resolution;
/// use glam::Vec2;
///
/// let mut cache = IntrinsicsCache::new();
/// let table = cache.ensure(Resolution::new(2, 2), |_| Vec2::ZERO);
/// assert_eq!(table.len(), 4);
/// assert!((table[0].inverse_radial_scale - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IntrinsicsCache {
    resolution: Option<Resolution>,
    entries: Vec<UnprojectionEntry>,
}

impl IntrinsicsCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            resolution: None,
            entries: Vec::new(),
        }
    }

    /// Returns the resolution the table was built for, if any.
    #[must_use]
    pub const fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Returns true if the table was built for `resolution`.
    #[must_use]
    pub fn is_current(&self, resolution: Resolution) -> bool {
        self.resolution == Some(resolution)
    }

    /// Returns the cached table.
    #[must_use]
    pub fn entries(&self) -> &[UnprojectionEntry] {
        &self.entries
    }

    /// Returns the table for `resolution`, rebuilding it if needed.
    ///
    /// `map` receives the pixel centre `(u + 0.5, v + 0.5)` and returns the
    /// unit-plane point. It is not called when the cached resolution
    /// matches.
    #[allow(clippy::cast_precision_loss)]
    pub fn ensure<F>(&mut self, resolution: Resolution, mut map: F) -> &[UnprojectionEntry]
    where
        F: FnMut(Vec2) -> Vec2,
    {
        if self.is_current(resolution) {
            return &self.entries;
        }

        debug!(%resolution, "Rebuilding unprojection table");
        self.entries.clear();
        self.entries.reserve(resolution.pixel_count());
        for v in 0..resolution.height {
            for u in 0..resolution.width {
                let uv = Vec2::new(u as f32 + 0.5, v as f32 + 0.5);
                self.entries.push(UnprojectionEntry::from_unit_plane(map(uv)));
            }
        }
        self.resolution = Some(resolution);
        &self.entries
    }

    /// Forgets the cached table so the next [`ensure`](Self::ensure) rebuilds.
    pub fn invalidate(&mut self) {
        self.resolution = None;
        self.entries.clear();
    }
}
