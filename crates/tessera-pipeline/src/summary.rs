//! Run statistics.

use core::fmt;

use crate::manifest::TileOutput;

/// Totals of a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tiles emitted by the strategy.
    pub tiles: usize,
    /// Points in the input cloud.
    pub input_points: usize,
    /// Segments written across all tiles.
    pub representations: usize,
    /// Points written across all segments.
    pub points_written: usize,
    /// Segment bytes written, excluding the manifest.
    pub bytes_written: u64,
}

impl RunSummary {
    pub(crate) fn record(&mut self, output: &TileOutput) {
        self.tiles += 1;
        self.representations += output.representations;
        self.points_written += output.points;
        self.bytes_written += output.bytes;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} points -> {} tiles, {} segments ({} points, {} bytes)",
            self.input_points, self.tiles, self.representations, self.points_written, self.bytes_written
        )
    }
}
