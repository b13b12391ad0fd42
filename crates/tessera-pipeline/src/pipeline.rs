//! End-to-end run: read, tile, write, publish the manifest.

use tessera_cloud::PointCloud;
use tessera_storage::read_ply_file;
use tracing::{info, info_span};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::manifest::{ManifestBuilder, write_manifest};
use crate::summary::RunSummary;

/// A validated run.
#[derive(Clone, Debug)]
pub struct TilingPipeline {
    config: PipelineConfig,
}

impl TilingPipeline {
    /// # Errors
    /// [`PipelineError::Config`] if `config` does not validate.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read the input file and process it.
    ///
    /// # Errors
    /// See [`Self::run_on`]; additionally [`PipelineError::Storage`] if the
    /// input cannot be read.
    pub fn run(&self) -> PipelineResult<RunSummary> {
        self.check_output_dir()?;
        let input = &self.config.input;
        let cloud = info_span!("read", path = %input.display()).in_scope(|| read_ply_file(input))?;
        self.process(&cloud)
    }

    /// Process an already loaded cloud.
    ///
    /// The manifest is written only after every segment succeeded.
    ///
    /// # Errors
    /// [`PipelineError::OutputDir`] if the output directory is missing, a
    /// segment or manifest write error otherwise.
    pub fn run_on(&self, cloud: &PointCloud) -> PipelineResult<RunSummary> {
        self.check_output_dir()?;
        self.process(cloud)
    }

    fn process(&self, cloud: &PointCloud) -> PipelineResult<RunSummary> {
        let (manifest, summary) = ManifestBuilder::new(&self.config)?.build(cloud)?;
        write_manifest(&manifest, &self.config.manifest_path)?;
        info!(
            tiles = summary.tiles,
            segments = summary.representations,
            bytes = summary.bytes_written,
            "{summary}"
        );
        Ok(summary)
    }

    fn check_output_dir(&self) -> PipelineResult<()> {
        if self.config.output_dir.is_dir() {
            Ok(())
        } else {
            Err(PipelineError::OutputDir(self.config.output_dir.clone()))
        }
    }
}
