//! Tiling benchmarks for both strategies.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessera_cloud::{Point, PointCloud};
use tessera_spatial::{Tiling, TilingConfig, TilingStrategy};

fn cloud(count: usize) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(42);
    PointCloud::new(
        (0..count)
            .map(|_| {
                Point::new(
                    rng.gen_range(0.0..100.0),
                    rng.gen_range(0.0..100.0),
                    rng.gen_range(0.0..20.0),
                )
            })
            .collect(),
    )
}

fn grid_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("uniform_grid");

    for count in [10_000, 100_000, 1_000_000] {
        let cloud = cloud(count);
        group.throughput(Throughput::Elements(count as u64));

        for (nx, ny, nz) in [(4, 4, 1), (32, 32, 8)] {
            let config = TilingConfig::grid(nx, ny, nz).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("{nx}x{ny}x{nz}"), count),
                &cloud,
                |b, cloud| {
                    b.iter(|| black_box(Tiling::new(cloud, config).make_tiles()));
                },
            );
        }
    }

    group.finish();
}

fn octree_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_octree");

    for count in [10_000, 100_000, 1_000_000] {
        let cloud = cloud(count);
        group.throughput(Throughput::Elements(count as u64));

        for max_points in [1_000, 20_000] {
            let config = TilingConfig::octree(max_points).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("max_{max_points}"), count),
                &cloud,
                |b, cloud| {
                    b.iter(|| black_box(Tiling::new(cloud, config).make_tiles()));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, grid_benchmarks, octree_benchmarks);
criterion_main!(benches);
