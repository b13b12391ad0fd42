//! Pipeline error types.

use std::io;
use std::path::PathBuf;

use tessera_cloud::ConfigError;
use tessera_storage::StorageError;
use thiserror::Error;

/// Pipeline error type.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reading the input or writing a segment failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The output directory is missing; it is never created.
    #[error("output directory {} does not exist", .0.display())]
    OutputDir(PathBuf),

    /// The worker pool could not be started.
    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The manifest could not be encoded.
    #[error("cannot encode manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest could not be written.
    #[error("cannot write manifest {}: {source}", .path.display())]
    Manifest { path: PathBuf, source: io::Error },
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
