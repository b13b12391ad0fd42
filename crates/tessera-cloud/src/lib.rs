//! Point cloud data model for tessera.
//!
//! Everything downstream of the reader works on the types in this crate:
//!
//! ```text
//! PointCloud ──tiling──▶ Tile { center, size, [Representation] }
//!                                              │
//!                                   level of detail stage
//!                                              ▼
//!                        Tile { center, size, [Representation; ratios] }
//! ```
//!
//! A [`Tile`]'s box is fixed when a tiling strategy creates it. Only its list
//! of [`Representation`]s changes afterwards. Every representation owns its
//! point buffer outright.
//!
//! The [`manifest`] module holds the fixed-shape records a tile projects
//! itself into for the JSON manifest.

mod bounds;
mod error;
pub mod manifest;
mod point;
mod tile;

pub use bounds::{Axis, Bounds};
pub use error::{ConfigError, ConfigResult};
pub use point::{Point, PointCloud, PointSchema, Precision, Rgb};
pub use tile::{Representation, Tile};
