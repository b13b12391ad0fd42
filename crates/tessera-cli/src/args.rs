//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use eyre::WrapErr;
use tessera_lod::LevelOfDetailGenerator;
use tessera_pipeline::{ManifestLayout, PipelineConfig};
use tessera_spatial::TilingConfig;
use tessera_storage::{ByteOrder, PlyEncoding, SegmentFormat};

// ============================================================================
// Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(about = "Cut a point cloud into tiles and generate their levels of detail")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub strategy: Strategy,

    /// Log per-tile progress
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Strategy {
    /// Uniform grid with a fixed number of tiles per axis
    Grid {
        /// PLY point cloud to tile (ASCII or binary)
        input: PathBuf,
        /// Tiles along x
        x_tiles: u32,
        /// Tiles along y (the up axis)
        y_tiles: u32,
        /// Tiles along z
        z_tiles: u32,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Adaptive octree with a bounded number of points per tile
    Octree {
        /// PLY point cloud to tile (ASCII or binary)
        input: PathBuf,
        /// Maximum points in one tile; coincident points may exceed it
        max_points: usize,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Where to save the JSON manifest
    pub manifest: PathBuf,

    /// Existing directory receiving the segment files; it is never created
    #[arg(short, long, env = "TESSERA_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Prefix of segment paths in the manifest
    #[arg(short = 'p', long, env = "TESSERA_SEGMENT_PREFIX", default_value = "")]
    pub segment_prefix: String,

    /// Subsampling ratios, one level of detail each (2 keeps half the points)
    #[arg(short, long, num_args = 1.., value_name = "RATIO")]
    pub lod: Vec<f64>,

    /// Segment file format
    #[arg(short, long, value_enum, default_value_t = Format::Ply)]
    pub format: Format,

    /// Write text PLY instead of binary
    #[arg(long)]
    pub ascii: bool,

    /// Byte order of binary PLY
    #[arg(long, value_enum, default_value_t = Endian::Little)]
    pub byte_order: Endian,

    /// One segment per tile with the flat manifest shape (single ratio only)
    #[arg(long)]
    pub flat: bool,

    /// Worker threads (defaults to the number of cores)
    #[arg(short = 'j', long, env = "TESSERA_THREADS")]
    pub threads: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Polygon file format
    Ply,
    /// Zlib-compressed geometry
    Compressed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Endian {
    Little,
    Big,
    Native,
}

// ============================================================================
// Conversion
// ============================================================================

impl Cli {
    /// Validated run configuration.
    pub fn into_config(self) -> eyre::Result<PipelineConfig> {
        let (input, strategy, output) = match self.strategy {
            Strategy::Grid {
                input,
                x_tiles,
                y_tiles,
                z_tiles,
                output,
            } => (input, TilingConfig::grid(x_tiles, y_tiles, z_tiles)?, output),
            Strategy::Octree {
                input,
                max_points,
                output,
            } => (input, TilingConfig::octree(max_points)?, output),
        };

        let lod = LevelOfDetailGenerator::new(output.lod).wrap_err("invalid --lod")?;
        let encoding = if output.ascii {
            PlyEncoding::Ascii
        } else {
            PlyEncoding::Binary(match output.byte_order {
                Endian::Little => ByteOrder::Little,
                Endian::Big => ByteOrder::Big,
                Endian::Native => ByteOrder::Native,
            })
        };

        let mut config = PipelineConfig::new(input, strategy, output.output_dir, output.manifest)
            .with_lod(lod)
            .with_segment_prefix(output.segment_prefix)
            .with_encoding(encoding)
            .with_format(match output.format {
                Format::Ply => SegmentFormat::Ply,
                Format::Compressed => SegmentFormat::Compressed,
            })
            .with_layout(if output.flat {
                ManifestLayout::Flat
            } else {
                ManifestLayout::Layered
            });
        if let Some(threads) = output.threads {
            config = config.with_threads(threads);
        }

        config.validate()?;
        Ok(config)
    }
}
