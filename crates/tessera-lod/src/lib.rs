//! Levels of detail by uniform stride subsampling.
//!
//! A tile's full-resolution buffer is sorted once by [`Point::total_cmp`]
//! (x, then y, then z, then color), then each ratio `r` keeps
//! `round(n / r)` points at indices `round(i * r)`:
//!
//! ```text
//! sorted:  0 1 2 3 4 5 6 7 8 9
//! r = 2:   0   2   4   6   8
//! r = 1:   0 1 2 3 4 5 6 7 8 9
//! ```
//!
//! Rounding is half-to-even throughout. Strided indices are not
//! de-duplicated; if rounding ever picks the same index twice the point
//! appears twice.
//!
//! The sort happens on the buffer moved out of the tile, so nothing else
//! observes a reordered copy.

use tessera_cloud::{ConfigError, ConfigResult, Point, Representation, Tile};
use tracing::debug;

/// Produces one representation per subsampling ratio.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelOfDetailGenerator {
    ratios: Vec<f64>,
}

impl Default for LevelOfDetailGenerator {
    /// Full resolution only.
    fn default() -> Self {
        Self { ratios: vec![1.0] }
    }
}

impl LevelOfDetailGenerator {
    /// Validate `ratios`. An empty list means full resolution only.
    ///
    /// # Errors
    /// [`ConfigError::SubsamplingRatio`] for the first ratio below 1.0 or
    /// not finite.
    pub fn new(ratios: impl IntoIterator<Item = f64>) -> ConfigResult<Self> {
        let ratios: Vec<f64> = ratios.into_iter().collect();
        if let Some(&bad) = ratios.iter().find(|r| !(r.is_finite() && **r >= 1.0)) {
            return Err(ConfigError::SubsamplingRatio(bad));
        }
        if ratios.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self { ratios })
    }

    #[must_use]
    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    /// Representations produced per tile.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.ratios.len()
    }

    /// Replace the tile's representations with one per ratio, in order.
    ///
    /// The first existing representation is taken as full resolution; any
    /// others are dropped. The tile's box is untouched.
    pub fn apply(&self, tile: &mut Tile) {
        let Some(full) = tile.take_representations().into_iter().next() else {
            return;
        };
        for representation in self.generate(full) {
            tile.push_representation(representation);
        }
    }

    /// Sort `full` and subsample it at every ratio.
    #[must_use]
    pub fn generate(&self, full: Representation) -> Vec<Representation> {
        let schema = full.schema();
        let sorted = sort_points(full.into_points());

        self.ratios
            .iter()
            .map(|&ratio| {
                let points = subsample(&sorted, ratio);
                debug!(ratio, from = sorted.len(), to = points.len(), "level of detail");
                Representation::new(schema, points)
            })
            .collect()
    }
}

/// Sort an owned buffer by [`Point::total_cmp`].
#[must_use]
pub fn sort_points(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by(Point::total_cmp);
    points
}

/// Number of points kept from `len` at `ratio`: `round(len / ratio)`.
#[must_use]
pub fn output_len(len: usize, ratio: f64) -> usize {
    (len as f64 / ratio).round_ties_even() as usize
}

/// Source indices kept from `len` points at `ratio`.
///
/// `round(i * ratio)` for each output slot, clamped to the last index.
/// Ratios of at least 1 give strictly increasing indices; smaller ratios
/// repeat indices and are kept as is.
pub fn stride_indices(len: usize, ratio: f64) -> impl Iterator<Item = usize> {
    let last = len.saturating_sub(1);
    (0..output_len(len, ratio)).map(move |i| ((i as f64 * ratio).round_ties_even() as usize).min(last))
}

/// Subsample an already sorted buffer at `ratio`.
///
/// A ratio of exactly 1.0 copies the buffer unchanged.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn subsample(sorted: &[Point], ratio: f64) -> Vec<Point> {
    if ratio == 1.0 {
        return sorted.to_vec();
    }
    stride_indices(sorted.len(), ratio).map(|i| sorted[i]).collect()
}
