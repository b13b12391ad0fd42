//! Spatial partitioning of point clouds into tiles.
//!
//! Two strategies cut a [`PointCloud`](tessera_cloud::PointCloud) into
//! [`Tile`](tessera_cloud::Tile)s, each holding one full-resolution
//! representation:
//!
//! - [`UniformGridTiling`] bins points into a fixed `nx × ny × nz` grid over
//!   the cloud's bounds. Only non-empty cells become tiles.
//! - [`AdaptiveOctreeTiling`] bisects boxes holding more than `max_points`
//!   points until every leaf is small enough.
//!
//! Both assign a point on an axis maximum to the last bin on that axis, so
//! every input point lands in exactly one tile.
//!
//! ```text
//!   x_min        cell        cell        x_max
//!     │ bin 0     │ bin 1     │ bin 2     │
//!     ●───────────●───────────●───────────●  ← point at x_max goes to bin 2
//! ```
//!
//! [`Tiling`] selects a strategy from a [`TilingConfig`].

mod binning;
mod grid;
mod octree;
mod strategy;

pub use binning::AxisBins;
pub use grid::{GridResolution, UniformGridTiling};
pub use octree::AdaptiveOctreeTiling;
pub use strategy::{Tiling, TilingConfig, TilingStrategy};
