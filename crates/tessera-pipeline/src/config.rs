//! Run configuration and output naming.
//!
//! For tile `n` and representation `i`:
//!
//! ```text
//! layered   file     <output_dir>/tile_<n>_<i>.<ext>
//!           segment  <segment_prefix>/tile_<n>_<i>.<ext>
//! flat      file     <output_dir>/tile_<n>.<ext>
//!           segment  <segment_prefix>/tile_<n>.<ext>
//! ```
//!
//! An empty segment prefix drops the leading `<segment_prefix>/`.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use tessera_cloud::{ConfigError, ConfigResult};
use tessera_lod::LevelOfDetailGenerator;
use tessera_spatial::TilingConfig;
use tessera_storage::{PlyEncoding, SegmentFormat, SegmentWriter};

/// Shape of the manifest entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ManifestLayout {
    /// Position, box and a list of representations per tile.
    #[default]
    Layered,
    /// Position, box and a single segment per tile.
    Flat,
}

/// Everything a run needs, validated once up front.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub strategy: TilingConfig,
    pub lod: LevelOfDetailGenerator,
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub segment_prefix: String,
    pub format: SegmentFormat,
    pub encoding: PlyEncoding,
    pub layout: ManifestLayout,
    pub threads: usize,
}

impl PipelineConfig {
    /// Configuration with full resolution only, binary little endian PLY,
    /// the layered manifest and one worker per available core.
    #[must_use]
    pub fn new(
        input: impl Into<PathBuf>,
        strategy: TilingConfig,
        output_dir: impl Into<PathBuf>,
        manifest_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            strategy,
            lod: LevelOfDetailGenerator::default(),
            output_dir: output_dir.into(),
            manifest_path: manifest_path.into(),
            segment_prefix: String::new(),
            format: SegmentFormat::default(),
            encoding: PlyEncoding::default(),
            layout: ManifestLayout::default(),
            threads: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
        }
    }

    #[must_use]
    pub fn with_lod(mut self, lod: LevelOfDetailGenerator) -> Self {
        self.lod = lod;
        self
    }

    #[must_use]
    pub fn with_segment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.segment_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: SegmentFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: PlyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: ManifestLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Check the parts that the component types cannot check alone.
    ///
    /// # Errors
    /// [`ConfigError::FlatLayout`] when the flat layout is combined with
    /// more than one level of detail, [`ConfigError::Threads`] for zero
    /// threads.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.layout == ManifestLayout::Flat && self.lod.levels() != 1 {
            return Err(ConfigError::FlatLayout(self.lod.levels()));
        }
        if self.threads == 0 {
            return Err(ConfigError::Threads);
        }
        Ok(())
    }

    /// Segment writer for the configured format and encoding.
    #[must_use]
    pub fn segment_writer(&self) -> SegmentWriter {
        SegmentWriter::new(self.format).with_encoding(self.encoding)
    }

    /// Manifest prefix of tile `n`'s layered segments.
    #[must_use]
    pub fn tile_segment_prefix(&self, n: usize) -> String {
        join_segment(&self.segment_prefix, &format!("tile_{n}"))
    }

    /// File of representation `i` of tile `n` in the layered layout.
    #[must_use]
    pub fn layered_file(&self, n: usize, i: usize) -> PathBuf {
        self.output_dir
            .join(format!("tile_{n}_{i}.{}", self.format.extension()))
    }

    /// Manifest segment of tile `n` in the flat layout.
    #[must_use]
    pub fn flat_segment(&self, n: usize) -> String {
        join_segment(&self.segment_prefix, &flat_name(n, self.format))
    }

    /// File of tile `n` in the flat layout.
    #[must_use]
    pub fn flat_file(&self, n: usize) -> PathBuf {
        self.output_dir.join(flat_name(n, self.format))
    }
}

fn flat_name(n: usize, format: SegmentFormat) -> String {
    format!("tile_{n}.{}", format.extension())
}

/// `prefix/name`, without a doubled or leading separator.
fn join_segment(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else if prefix.ends_with('/') {
        format!("{prefix}{name}")
    } else {
        format!("{prefix}/{name}")
    }
}
