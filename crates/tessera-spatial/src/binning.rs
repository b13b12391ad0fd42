//! Per-axis binning shared by both strategies.

use core::num::NonZeroU32;

/// Equal-width bins along one axis of a box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisBins {
    min: f64,
    cell_size: f64,
    count: u32,
}

impl AxisBins {
    /// Split `[min, min + extent]` into `count` bins.
    ///
    /// A zero extent (or one too small to divide) collapses to a single bin
    /// of size 0.
    #[must_use]
    pub fn new(min: f64, extent: f64, count: NonZeroU32) -> Self {
        let cell_size = extent / f64::from(count.get());
        if cell_size > 0.0 {
            Self {
                min,
                cell_size,
                count: count.get(),
            }
        } else {
            Self {
                min,
                cell_size: 0.0,
                count: 1,
            }
        }
    }

    /// Bin holding coordinate `c`.
    ///
    /// `floor((c - min) / cell_size)` clamped to `[0, count - 1]`, so the
    /// axis maximum falls in the last bin.
    #[inline]
    #[must_use]
    pub fn index(&self, c: f64) -> usize {
        if self.is_degenerate() {
            return 0;
        }
        // Saturating cast: negative and NaN map to 0.
        let raw = ((c - self.min) / self.cell_size).floor() as usize;
        raw.min(self.count as usize - 1)
    }

    #[inline]
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of bins actually used.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Whether the axis collapsed to a single zero-size bin.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.cell_size == 0.0
    }

    /// Lower edge of bin `index`.
    #[must_use]
    pub fn lower(&self, index: usize) -> f64 {
        self.min + index as f64 * self.cell_size
    }

    /// Center of bin `index`.
    #[must_use]
    pub fn center(&self, index: usize) -> f64 {
        self.lower(index) + self.cell_size / 2.0
    }
}
