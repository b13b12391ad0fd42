//! Strategy selection.

use core::fmt;
use core::num::NonZeroUsize;

use tessera_cloud::{Axis, ConfigError, ConfigResult, PointCloud, Tile};

use crate::{AdaptiveOctreeTiling, GridResolution, UniformGridTiling};

/// Cuts a point cloud into tiles.
///
/// Implementations guarantee that every input point appears in exactly one
/// returned tile, that no returned tile is empty, and that the same input
/// and configuration always produce the same tiles in the same order.
pub trait TilingStrategy {
    fn make_tiles(&self) -> Vec<Tile>;
}

/// Validated strategy parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TilingConfig {
    /// Fixed `nx × ny × nz` grid.
    Grid(GridResolution),
    /// Octree with at most `max_points` points per leaf.
    Octree { max_points: NonZeroUsize },
}

impl TilingConfig {
    /// # Errors
    /// [`ConfigError::TileCount`] if any count is zero.
    pub fn grid(x_tiles: u32, y_tiles: u32, z_tiles: u32) -> ConfigResult<Self> {
        GridResolution::new(x_tiles, y_tiles, z_tiles).map(Self::Grid)
    }

    /// # Errors
    /// [`ConfigError::MaxPoints`] if `max_points` is zero.
    pub fn octree(max_points: usize) -> ConfigResult<Self> {
        NonZeroUsize::new(max_points)
            .map(|max_points| Self::Octree { max_points })
            .ok_or(ConfigError::MaxPoints)
    }
}

impl fmt::Display for TilingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(resolution) => write!(
                f,
                "grid {}x{}x{}",
                resolution.count(Axis::X),
                resolution.count(Axis::Y),
                resolution.count(Axis::Z)
            ),
            Self::Octree { max_points } => write!(f, "octree (max {max_points} points)"),
        }
    }
}

/// A strategy bound to its cloud.
#[derive(Debug)]
pub enum Tiling<'a> {
    Grid(UniformGridTiling<'a>),
    Octree(AdaptiveOctreeTiling<'a>),
}

impl<'a> Tiling<'a> {
    #[must_use]
    pub const fn new(cloud: &'a PointCloud, config: TilingConfig) -> Self {
        match config {
            TilingConfig::Grid(resolution) => Self::Grid(UniformGridTiling::new(cloud, resolution)),
            TilingConfig::Octree { max_points } => {
                Self::Octree(AdaptiveOctreeTiling::with_capacity(cloud, max_points))
            }
        }
    }
}

impl TilingStrategy for Tiling<'_> {
    fn make_tiles(&self) -> Vec<Tile> {
        match self {
            Self::Grid(grid) => grid.make_tiles(),
            Self::Octree(octree) => octree.make_tiles(),
        }
    }
}
