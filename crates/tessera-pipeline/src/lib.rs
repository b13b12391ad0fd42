//! Tessera run orchestration.
//!
//! A run reads a PLY cloud, partitions it with the configured
//! [`TilingConfig`](tessera_spatial::TilingConfig), expands every tile into
//! its levels of detail, writes one segment file per representation and
//! finally publishes a JSON manifest describing all tiles:
//!
//! ```text
//! PipelineConfig ──validate──▶ TilingPipeline::run
//!                                 │
//!          read_ply_file ◀────────┤
//!                                 ▼
//!                          ManifestBuilder::build ──▶ tile_<n>_<i>.<ext>
//!                                 │
//!                                 ▼
//!                          write_manifest ──▶ manifest.json
//! ```
//!
//! Any failure aborts the run before the manifest is written, so a manifest
//! on disk always describes a complete set of segments.

mod config;
mod error;
mod manifest;
mod pipeline;
mod summary;

pub use config::{ManifestLayout, PipelineConfig};
pub use error::{PipelineError, PipelineResult};
pub use manifest::{ManifestBuilder, TileOutput, write_manifest};
pub use pipeline::TilingPipeline;
pub use summary::RunSummary;
