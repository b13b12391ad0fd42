//! End-to-end runs against scratch directories.

use std::fs::{self, File};
use std::path::Path;

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessera_cloud::manifest::{FlatTile, LayeredTile, Manifest, Position, RepresentationEntry, TileEntry};
use tessera_cloud::{Point, PointCloud, PointSchema, Precision, Representation, Rgb};
use tessera_lod::LevelOfDetailGenerator;
use tessera_pipeline::{ManifestLayout, PipelineConfig, PipelineError, TilingPipeline};
use tessera_spatial::TilingConfig;
use tessera_storage::{
    DeflateCodec, GeometryCodec, PlyEncoding, SegmentFormat, StorageError, read_ply_file, write_ply,
};

// ============================================================================
// Helpers
// ============================================================================

fn write_input(path: &Path, points: Vec<Point>) {
    let schema = PointSchema::new(Precision::Double, points.iter().all(|p| p.color.is_some()));
    let file = File::create(path).unwrap();
    write_ply(file, &Representation::new(schema, points), PlyEncoding::Ascii).unwrap();
}

fn read_manifest(path: &Path) -> Manifest {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

/// Five colored points on the x axis, x = 0..=4.
fn five_on_a_line() -> Vec<Point> {
    (0..5u8)
        .map(|x| Point::new(f64::from(x), 0.0, 0.0).with_color(Rgb::new(x, 0, 0)))
        .collect()
}

/// Seeded scattered cloud.
fn scattered(count: usize) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(0x2545_f491);
    (0..count)
        .map(|_| {
            Point::new(
                rng.gen_range(0.0..100.0),
                rng.gen_range(0.0..20.0),
                rng.gen_range(0.0..1.0),
            )
        })
        .collect()
}

fn entry(position: [f64; 3], size: [f64; 3], representations: &[(usize, &str)]) -> TileEntry {
    TileEntry::Layered(LayeredTile {
        position: Position::from(position),
        width: size[0],
        height: size[1],
        depth: size[2],
        representations: representations
            .iter()
            .map(|&(points, segment)| RepresentationEntry {
                points,
                segment: segment.to_owned(),
            })
            .collect(),
    })
}

// ============================================================================
// Layouts
// ============================================================================

#[test]
fn test_grid_run_with_levels_of_detail() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cloud.ply");
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    write_input(&input, five_on_a_line());

    let config = PipelineConfig::new(
        &input,
        TilingConfig::grid(2, 1, 1).unwrap(),
        &out,
        dir.path().join("manifest.json"),
    )
    .with_lod(LevelOfDetailGenerator::new([1.0, 2.0]).unwrap())
    .with_segment_prefix("tiles");

    let summary = TilingPipeline::new(config).unwrap().run().unwrap();

    assert_eq!(summary.tiles, 2);
    assert_eq!(summary.input_points, 5);
    assert_eq!(summary.representations, 4);
    assert_eq!(summary.points_written, 5 + 1 + 2);

    let manifest = read_manifest(&dir.path().join("manifest.json"));
    assert_eq!(
        manifest.tiles,
        [
            entry(
                [1.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                &[(2, "tiles/tile_0_0.ply"), (1, "tiles/tile_0_1.ply")]
            ),
            entry(
                [3.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                &[(3, "tiles/tile_1_0.ply"), (2, "tiles/tile_1_1.ply")]
            ),
        ]
    );

    // Half the points of tile 1, taken at stride 2 from the sorted buffer.
    let coarse = read_ply_file(&out.join("tile_1_1.ply")).unwrap();
    let xs: Vec<f64> = coarse.points().iter().map(|p| p.x).collect();
    assert_eq!(xs, [2.0, 4.0]);
    assert_eq!(coarse.points()[1].color, Some(Rgb::new(4, 0, 0)));
}

#[test]
fn test_flat_layout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cloud.ply");
    write_input(&input, five_on_a_line());

    let config = PipelineConfig::new(
        &input,
        TilingConfig::grid(2, 1, 1).unwrap(),
        dir.path(),
        dir.path().join("manifest.json"),
    )
    .with_layout(ManifestLayout::Flat);

    TilingPipeline::new(config).unwrap().run().unwrap();

    let manifest = read_manifest(&dir.path().join("manifest.json"));
    assert_eq!(
        manifest.tiles[1],
        TileEntry::Flat(FlatTile {
            x: 3.0,
            y: 0.0,
            z: 0.0,
            width: 2.0,
            height: 0.0,
            depth: 0.0,
            segment: "tile_1.ply".to_owned(),
        })
    );
    assert_eq!(read_ply_file(&dir.path().join("tile_0.ply")).unwrap().len(), 2);
    assert!(!dir.path().join("tile_0_0.ply").exists());
}

#[test]
fn test_manifest_json_keys() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("manifest.json");
    let config = PipelineConfig::new("unused.ply", TilingConfig::octree(10).unwrap(), dir.path(), &manifest_path);

    let cloud = PointCloud::new(five_on_a_line());
    TilingPipeline::new(config).unwrap().run_on(&cloud).unwrap();

    let json: serde_json::Value = serde_json::from_slice(&fs::read(&manifest_path).unwrap()).unwrap();
    let tile = &json["tiles"][0];
    assert_eq!(tile["position"]["x"], 2.0);
    assert_eq!(tile["width"], 4.0);
    assert_eq!(tile["representations"][0]["points"], 5);
    assert_eq!(tile["representations"][0]["segment"], "tile_0_0.ply");
}

// ============================================================================
// Formats and concurrency
// ============================================================================

#[test]
fn test_octree_run_compressed_segments() {
    let dir = tempfile::tempdir().unwrap();
    let points = scattered(2_000);
    let cloud = PointCloud::new(points.clone());

    let config = PipelineConfig::new(
        "unused.ply",
        TilingConfig::octree(64).unwrap(),
        dir.path(),
        dir.path().join("manifest.json"),
    )
    .with_format(SegmentFormat::Compressed)
    .with_threads(4);

    let summary = TilingPipeline::new(config).unwrap().run_on(&cloud).unwrap();
    let manifest = read_manifest(&dir.path().join("manifest.json"));
    assert_eq!(manifest.tiles.len(), summary.tiles);

    let codec = DeflateCodec::default();
    let mut decoded = Vec::new();
    for (n, tile) in manifest.tiles.iter().enumerate() {
        let TileEntry::Layered(tile) = tile else {
            panic!("expected layered entries");
        };
        assert!(tile.representations[0].points <= 64);
        assert_eq!(tile.representations[0].segment, format!("tile_{n}_0.pcz"));

        let buffer = fs::read(dir.path().join(format!("tile_{n}_0.pcz"))).unwrap();
        let geometry = codec.decode(&buffer).unwrap();
        assert_eq!(geometry.positions.len(), tile.representations[0].points);
        assert_eq!(geometry.colors, None);
        decoded.extend(geometry.positions);
    }

    let mut expected: Vec<[f64; 3]> = points.iter().map(Point::position).collect();
    let by_position = |a: &[f64; 3], b: &[f64; 3]| {
        a[0].total_cmp(&b[0])
            .then(a[1].total_cmp(&b[1]))
            .then(a[2].total_cmp(&b[2]))
    };
    expected.sort_by(by_position);
    decoded.sort_by(by_position);
    assert_eq!(decoded, expected);
}

#[test]
fn test_thread_count_does_not_change_output() {
    let cloud = PointCloud::new(scattered(1_500));
    let run = |threads: usize| {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::new(
            "unused.ply",
            TilingConfig::grid(5, 3, 2).unwrap(),
            dir.path(),
            dir.path().join("manifest.json"),
        )
        .with_lod(LevelOfDetailGenerator::new([1.0, 3.0]).unwrap())
        .with_encoding(PlyEncoding::Ascii)
        .with_threads(threads);
        TilingPipeline::new(config).unwrap().run_on(&cloud).unwrap();

        let manifest = fs::read(dir.path().join("manifest.json")).unwrap();
        let segment = fs::read(dir.path().join("tile_7_1.ply")).unwrap();
        (manifest, segment)
    };

    assert_eq!(run(1), run(8));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("manifest.json");
    let config = PipelineConfig::new(
        "unused.ply",
        TilingConfig::octree(2).unwrap(),
        dir.path().join("absent"),
        &manifest_path,
    );

    let err = TilingPipeline::new(config)
        .unwrap()
        .run_on(&PointCloud::new(five_on_a_line()))
        .unwrap_err();

    assert!(matches!(err, PipelineError::OutputDir(_)));
    assert!(!manifest_path.exists());
    assert!(!dir.path().join("absent").exists());
}

#[test]
fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new(
        dir.path().join("absent.ply"),
        TilingConfig::octree(2).unwrap(),
        dir.path(),
        dir.path().join("manifest.json"),
    );

    let err = TilingPipeline::new(config).unwrap().run().unwrap_err();
    assert!(matches!(err, PipelineError::Storage(StorageError::Open { .. })));
}

#[test]
fn test_failed_segment_leaves_no_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("manifest.json");
    // A directory where tile 0's file should go.
    fs::create_dir(dir.path().join("tile_0_0.ply")).unwrap();

    let config = PipelineConfig::new(
        "unused.ply",
        TilingConfig::grid(2, 1, 1).unwrap(),
        dir.path(),
        &manifest_path,
    );
    let err = TilingPipeline::new(config)
        .unwrap()
        .run_on(&PointCloud::new(five_on_a_line()))
        .unwrap_err();

    assert!(matches!(err, PipelineError::Storage(StorageError::Write { .. })));
    assert!(!manifest_path.exists());
}

#[test]
fn test_invalid_config_rejected_up_front() {
    let config = PipelineConfig::new("a.ply", TilingConfig::grid(1, 1, 1).unwrap(), "out", "m.json")
        .with_layout(ManifestLayout::Flat)
        .with_lod(LevelOfDetailGenerator::new([1.0, 2.0]).unwrap());

    assert!(matches!(
        TilingPipeline::new(config),
        Err(PipelineError::Config(_))
    ));
}
