//! Per-tile processing and manifest assembly.

use std::fs;
use std::path::Path;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tessera_cloud::manifest::{Manifest, TileEntry};
use tessera_cloud::{ConfigResult, PointCloud, Representation, Tile};
use tessera_spatial::{Tiling, TilingStrategy};
use tessera_storage::SegmentWriter;
use tracing::{debug, debug_span, info, info_span};

use crate::config::{ManifestLayout, PipelineConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::summary::RunSummary;

/// What one tile contributed to the run.
#[derive(Clone, Debug, PartialEq)]
pub struct TileOutput {
    pub entry: TileEntry,
    pub representations: usize,
    pub points: usize,
    pub bytes: u64,
}

/// Runs a tiling strategy, the level-of-detail stage and segment
/// serialization, then folds the per-tile entries into one [`Manifest`].
///
/// ```text
/// cloud ──make_tiles──▶ [tile 0, tile 1, ...]
///                         │ par_iter (indexed)
///                         ▼
///                  lod.apply ─▶ write segments ─▶ TileEntry
///                         │ collect in tile order
///                         ▼
///                      Manifest
/// ```
#[derive(Debug)]
pub struct ManifestBuilder<'c> {
    config: &'c PipelineConfig,
    writer: SegmentWriter,
}

impl<'c> ManifestBuilder<'c> {
    /// # Errors
    /// Any [`tessera_cloud::ConfigError`] from [`PipelineConfig::validate`].
    pub fn new(config: &'c PipelineConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            writer: config.segment_writer(),
        })
    }

    /// Tile `cloud`, write every segment and return the manifest.
    ///
    /// Tiles are processed on a pool of `config.threads` workers; manifest
    /// order is tile order regardless of completion order. The first failed
    /// segment aborts the build.
    ///
    /// # Errors
    /// [`PipelineError::ThreadPool`] if the pool cannot start, or the first
    /// [`PipelineError::Storage`] raised while writing segments.
    pub fn build(&self, cloud: &PointCloud) -> PipelineResult<(Manifest, RunSummary)> {
        let strategy = self.config.strategy;
        let tiles = info_span!("tiling", %strategy, points = cloud.len())
            .in_scope(|| Tiling::new(cloud, strategy).make_tiles());

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("tessera-worker-{i}"))
            .build()?;

        let outputs = info_span!("segments", tiles = tiles.len(), threads = self.config.threads).in_scope(|| {
            pool.install(|| {
                tiles
                    .into_par_iter()
                    .enumerate()
                    .map(|(n, tile)| self.process_tile(n, tile))
                    .collect::<PipelineResult<Vec<_>>>()
            })
        })?;

        let mut summary = RunSummary {
            input_points: cloud.len(),
            ..RunSummary::default()
        };
        let mut manifest = Manifest::default();
        for output in outputs {
            summary.record(&output);
            manifest.tiles.push(output.entry);
        }
        Ok((manifest, summary))
    }

    /// Generate levels of detail for tile `n`, write its segments and
    /// describe it.
    ///
    /// # Errors
    /// [`PipelineError::Storage`] if a segment cannot be written.
    pub fn process_tile(&self, n: usize, mut tile: Tile) -> PipelineResult<TileOutput> {
        let _span = debug_span!("tile", n).entered();
        self.config.lod.apply(&mut tile);

        let mut bytes = 0;
        let entry = match self.config.layout {
            ManifestLayout::Layered => {
                for (i, representation) in tile.representations().iter().enumerate() {
                    bytes += self.writer.write(representation, &self.config.layered_file(n, i))?;
                }
                let prefix = self.config.tile_segment_prefix(n);
                TileEntry::from(tile.manifest_entry(&prefix, self.config.format.extension()))
            }
            ManifestLayout::Flat => {
                if let Some(representation) = tile.representations().first() {
                    bytes += self.writer.write(representation, &self.config.flat_file(n))?;
                }
                TileEntry::from(tile.flat_entry(self.config.flat_segment(n)))
            }
        };

        let output = TileOutput {
            entry,
            representations: tile.representations().len(),
            points: tile.representations().iter().map(Representation::len).sum(),
            bytes,
        };
        debug!(
            representations = output.representations,
            points = output.points,
            bytes = output.bytes,
            "tile written"
        );
        Ok(output)
    }
}

/// Write `manifest` as compact JSON to `path`, replacing any existing file.
///
/// # Errors
/// [`PipelineError::Json`] if encoding fails, [`PipelineError::Manifest`]
/// if the file cannot be written.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> PipelineResult<()> {
    let json = serde_json::to_vec(manifest)?;
    fs::write(path, &json).map_err(|source| PipelineError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), tiles = manifest.tiles.len(), bytes = json.len(), "wrote manifest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tessera_cloud::Point;
    use tessera_lod::LevelOfDetailGenerator;
    use tessera_spatial::TilingConfig;

    use super::*;

    fn line(n: u32) -> PointCloud {
        PointCloud::new((0..n).map(|x| Point::new(f64::from(x), 0.0, 0.0)).collect())
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = PipelineConfig::new("in.ply", TilingConfig::octree(4).unwrap(), "out", "m.json")
            .with_threads(0);
        assert!(ManifestBuilder::new(&config).is_err());
    }

    #[test]
    fn test_build_orders_by_tile() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::new(
            "in.ply",
            TilingConfig::grid(4, 1, 1).unwrap(),
            dir.path(),
            dir.path().join("m.json"),
        )
        .with_lod(LevelOfDetailGenerator::new([1.0, 2.0]).unwrap())
        .with_threads(3);

        let builder = ManifestBuilder::new(&config).unwrap();
        let (manifest, summary) = builder.build(&line(8)).unwrap();

        assert_eq!(manifest.tiles.len(), 4);
        assert_eq!(summary.tiles, 4);
        assert_eq!(summary.representations, 8);
        assert_eq!(summary.points_written, 8 + 4);

        for (n, entry) in manifest.tiles.iter().enumerate() {
            let TileEntry::Layered(tile) = entry else {
                panic!("expected layered entries");
            };
            assert_eq!(tile.representations[0].segment, format!("tile_{n}_0.ply"));
            assert_eq!(tile.representations[1].segment, format!("tile_{n}_1.ply"));
            assert!(dir.path().join(format!("tile_{n}_1.ply")).is_file());
        }
    }

    #[test]
    fn test_empty_cloud_builds_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::new("in.ply", TilingConfig::octree(1).unwrap(), dir.path(), "m.json");
        let (manifest, summary) = ManifestBuilder::new(&config)
            .unwrap()
            .build(&PointCloud::default())
            .unwrap();
        assert!(manifest.tiles.is_empty());
        assert_eq!(summary, RunSummary::default());
    }
}
