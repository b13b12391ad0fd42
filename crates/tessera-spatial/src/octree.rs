//! Adaptive octree tiling bounded by point count.

use core::num::{NonZeroU32, NonZeroUsize};

use tessera_cloud::{
    Axis, Bounds, ConfigError, ConfigResult, Point, PointCloud, PointSchema, Representation, Tile,
};
use tracing::{debug, info, warn};

use crate::{AxisBins, TilingStrategy};

const TWO: NonZeroU32 = NonZeroU32::new(2).unwrap();

/// Octant index of per-axis bins `[i, j, k]`, x-major.
#[inline]
const fn octant_index([i, j, k]: [usize; 3]) -> usize {
    (i << 2) | (j << 1) | k
}

/// Per-axis bins `[i, j, k]` of an octant index.
#[inline]
const fn octant_bins(octant: usize) -> [usize; 3] {
    [(octant >> 2) & 1, (octant >> 1) & 1, octant & 1]
}

/// A pending box and the points inside it.
struct Node {
    points: Vec<Point>,
    center: [f64; 3],
    size: [f64; 3],
    depth: u32,
}

impl Node {
    fn into_tile(self, schema: PointSchema) -> Tile {
        Tile::new(
            self.center,
            self.size,
            Representation::new(schema, self.points),
        )
    }
}

/// Cuts a cloud into octree leaves of at most `max_points` points.
///
/// A node over the limit is split at the midpoint of its points' bounds
/// into eight octants. Leaves are emitted depth first in octant order
/// (x-major), which is not a global spatial order.
///
/// A node that cannot be split (its points coincide, or its extent
/// overflows so every point bins into one octant) becomes a leaf whatever
/// its size.
#[derive(Debug)]
pub struct AdaptiveOctreeTiling<'a> {
    cloud: &'a PointCloud,
    max_points: NonZeroUsize,
}

impl<'a> AdaptiveOctreeTiling<'a> {
    /// # Errors
    /// [`ConfigError::MaxPoints`] when `max_points` is zero.
    pub fn new(cloud: &'a PointCloud, max_points: usize) -> ConfigResult<Self> {
        let max_points = NonZeroUsize::new(max_points).ok_or(ConfigError::MaxPoints)?;
        Ok(Self::with_capacity(cloud, max_points))
    }

    #[must_use]
    pub const fn with_capacity(cloud: &'a PointCloud, max_points: NonZeroUsize) -> Self {
        Self { cloud, max_points }
    }

    #[must_use]
    pub const fn max_points(&self) -> NonZeroUsize {
        self.max_points
    }

    /// Split `node` into its non-empty octants. A node that cannot be
    /// separated (all points coincide, or every point lands in one octant)
    /// is handed back unchanged.
    fn split(node: Node) -> Result<Vec<Node>, Node> {
        let Some(bounds) = Bounds::from_points(&node.points) else {
            return Ok(Vec::new());
        };
        let bins = Axis::ALL.map(|axis| AxisBins::new(bounds.min(axis), bounds.extent(axis), TWO));
        if bins.iter().all(AxisBins::is_degenerate) {
            return Err(node);
        }

        let Node {
            points,
            center,
            size: node_size,
            depth,
        } = node;
        let mut octants: [Vec<Point>; 8] = Default::default();
        for point in points {
            let ijk = Axis::ALL.map(|axis| bins[axis.index()].index(point.coord(axis)));
            octants[octant_index(ijk)].push(point);
        }

        // An overflowing extent bins everything together; the child would
        // equal its parent.
        if octants.iter().filter(|points| !points.is_empty()).count() == 1 {
            let points = octants.into_iter().flatten().collect();
            return Err(Node {
                points,
                center,
                size: node_size,
                depth,
            });
        }

        let size = bins.map(|b| b.cell_size());
        let children = octants
            .into_iter()
            .enumerate()
            .filter(|(_, points)| !points.is_empty())
            .map(|(octant, points)| {
                let ijk = octant_bins(octant);
                Node {
                    points,
                    center: Axis::ALL.map(|axis| bins[axis.index()].center(ijk[axis.index()])),
                    size,
                    depth: depth + 1,
                }
            })
            .collect();
        Ok(children)
    }
}

impl TilingStrategy for AdaptiveOctreeTiling<'_> {
    fn make_tiles(&self) -> Vec<Tile> {
        let Some(bounds) = self.cloud.bounds() else {
            return Vec::new();
        };
        let schema = self.cloud.schema();
        let max_points = self.max_points.get();

        let mut tiles = Vec::new();
        let mut forced = 0usize;
        let mut max_depth = 0u32;
        let mut stack = vec![Node {
            points: self.cloud.points().to_vec(),
            center: bounds.center(),
            size: bounds.extents(),
            depth: 0,
        }];

        while let Some(node) = stack.pop() {
            max_depth = max_depth.max(node.depth);

            if node.points.len() <= max_points {
                debug!(depth = node.depth, points = node.points.len(), "octree leaf");
                tiles.push(node.into_tile(schema));
                continue;
            }

            match Self::split(node) {
                Ok(children) => {
                    // Reversed so octant 0 is popped first.
                    stack.extend(children.into_iter().rev());
                }
                Err(node) => {
                    warn!(
                        depth = node.depth,
                        points = node.points.len(),
                        max_points,
                        "inseparable points, forcing an oversized leaf"
                    );
                    forced += 1;
                    tiles.push(node.into_tile(schema));
                }
            }
        }

        info!(
            points = self.cloud.len(),
            max_points,
            tiles = tiles.len(),
            forced_leaves = forced,
            max_depth,
            "adaptive octree tiling done"
        );
        tiles
    }
}
