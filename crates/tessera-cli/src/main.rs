//! Tessera point cloud tiler.
//!
//! ```bash
//! # 4x2x1 grid, full resolution plus a half and a quarter density level
//! tessera grid cloud.ply 4 2 1 manifest.json -o tiles/ --lod 1 2 4
//!
//! # Octree tiles of at most 50k points, compressed segments
//! tessera octree cloud.ply 50000 manifest.json -o tiles/ --format compressed
//! ```
//!
//! Tessera crates log at `info` (`debug` with `--verbose`). A non-empty
//! `RUST_LOG` replaces these defaults entirely.

mod args;

use clap::Parser;
use eyre::WrapErr;
use tessera_pipeline::TilingPipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::Cli;

const CRATES: [&str; 5] = [
    "tessera",
    "tessera_pipeline",
    "tessera_spatial",
    "tessera_lod",
    "tessera_storage",
];

/// `RUST_LOG` when set, otherwise one directive per tessera crate.
fn log_filter(rust_log: Option<&str>, verbose: bool) -> eyre::Result<EnvFilter> {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::try_new(directives).wrap_err("invalid RUST_LOG");
    }

    let level = if verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::default();
    for krate in CRATES {
        filter = filter.add_directive(format!("{krate}={level}").parse()?);
    }
    Ok(filter)
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), cli.verbose)?)
        .init();

    let config = cli.into_config()?;
    info!(
        input = %config.input.display(),
        strategy = %config.strategy,
        levels = config.lod.levels(),
        format = %config.format,
        threads = config.threads,
        "starting"
    );

    let input = config.input.clone();
    let summary = TilingPipeline::new(config)?
        .run()
        .wrap_err_with(|| format!("failed to tile {}", input.display()))?;

    info!(
        tiles = summary.tiles,
        segments = summary.representations,
        bytes = summary.bytes_written,
        "done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        let filter = log_filter(None, false).unwrap().to_string();
        assert!(filter.contains("tessera_pipeline=info"), "{filter}");

        let filter = log_filter(Some("  "), true).unwrap().to_string();
        assert!(filter.contains("tessera_storage=debug"), "{filter}");
    }

    #[test]
    fn test_rust_log_wins() {
        let filter = log_filter(Some("tessera_storage=trace"), true).unwrap().to_string();
        assert!(filter.contains("tessera_storage=trace"), "{filter}");
        assert!(!filter.contains("tessera_storage=debug"), "{filter}");
        assert!(!filter.contains("tessera_pipeline"), "{filter}");
    }

    #[test]
    fn test_invalid_rust_log() {
        assert!(log_filter(Some("tessera=loud"), false).is_err());
    }
}
