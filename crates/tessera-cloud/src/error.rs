//! Configuration error types.

use thiserror::Error;

use crate::Axis;

/// Invalid configuration detected before any work is done.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A grid axis was given zero tiles.
    #[error("there must be at least 1 tile for the {axis} axis")]
    TileCount { axis: Axis },

    /// The octree leaf capacity was zero.
    #[error("there must be at least one point in each tile")]
    MaxPoints,

    /// A subsampling ratio below 1.0 (or not a number).
    #[error("the subsampling ratio must be at least 1, got {0}")]
    SubsamplingRatio(f64),

    /// The flat manifest layout only describes a single representation.
    #[error("the flat manifest layout needs exactly one level of detail, got {0}")]
    FlatLayout(usize),

    /// Zero worker threads.
    #[error("the worker pool needs at least one thread")]
    Threads,
}

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;
