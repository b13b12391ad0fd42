//! Fixed-resolution grid tiling.

use std::collections::BTreeMap;

use core::num::NonZeroU32;

use rayon::prelude::*;
use tessera_cloud::{Axis, ConfigError, ConfigResult, Point, PointCloud, Representation, Tile};
use tracing::{info, warn};

use crate::{AxisBins, TilingStrategy};

/// Tile count along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridResolution {
    counts: [NonZeroU32; 3],
}

impl GridResolution {
    /// Validate per-axis tile counts.
    ///
    /// # Errors
    /// [`ConfigError::TileCount`] for the first axis with zero tiles.
    pub fn new(x_tiles: u32, y_tiles: u32, z_tiles: u32) -> ConfigResult<Self> {
        let check = |axis: Axis, count: u32| {
            NonZeroU32::new(count).ok_or(ConfigError::TileCount { axis })
        };
        Ok(Self {
            counts: [
                check(Axis::X, x_tiles)?,
                check(Axis::Y, y_tiles)?,
                check(Axis::Z, z_tiles)?,
            ],
        })
    }

    /// Tile count along `axis`.
    #[inline]
    #[must_use]
    pub const fn count(&self, axis: Axis) -> NonZeroU32 {
        self.counts[axis.index()]
    }

    /// Total number of grid cells, empty ones included.
    #[must_use]
    pub fn cells(&self) -> u64 {
        self.counts.iter().map(|c| u64::from(c.get())).product()
    }
}

/// Cuts a cloud into a uniform `nx × ny × nz` grid over its bounds.
///
/// Tiles come out in x-major order (x, then y, then z) and only for cells
/// holding at least one point.
#[derive(Debug)]
pub struct UniformGridTiling<'a> {
    cloud: &'a PointCloud,
    resolution: GridResolution,
}

impl<'a> UniformGridTiling<'a> {
    #[must_use]
    pub const fn new(cloud: &'a PointCloud, resolution: GridResolution) -> Self {
        Self { cloud, resolution }
    }

    #[must_use]
    pub const fn resolution(&self) -> GridResolution {
        self.resolution
    }
}

impl TilingStrategy for UniformGridTiling<'_> {
    fn make_tiles(&self) -> Vec<Tile> {
        let Some(bounds) = self.cloud.bounds() else {
            return Vec::new();
        };

        let bins = Axis::ALL.map(|axis| {
            AxisBins::new(
                bounds.min(axis),
                bounds.extent(axis),
                self.resolution.count(axis),
            )
        });
        for axis in Axis::ALL {
            if bins[axis.index()].is_degenerate() {
                warn!(%axis, "zero extent, using a single bin");
            }
        }

        let cell_of = |point: &Point| Axis::ALL.map(|axis| bins[axis.index()].index(point.coord(axis)));
        let keys: Vec<[usize; 3]> = self.cloud.points().par_iter().map(cell_of).collect();

        // Ordered map keeps x-major emission order without a dense grid.
        let mut cells: BTreeMap<[usize; 3], Vec<Point>> = BTreeMap::new();
        for (key, point) in keys.into_iter().zip(self.cloud.points()) {
            cells.entry(key).or_default().push(*point);
        }

        let schema = self.cloud.schema();
        let size = bins.map(|b| b.cell_size());
        let tiles: Vec<Tile> = cells
            .into_iter()
            .map(|(key, points)| {
                let center = Axis::ALL.map(|axis| bins[axis.index()].center(key[axis.index()]));
                Tile::new(center, size, Representation::new(schema, points))
            })
            .collect();

        info!(
            points = self.cloud.len(),
            cells = self.resolution.cells(),
            tiles = tiles.len(),
            "uniform grid tiling done"
        );
        tiles
    }
}
