//! Tiles and their representations.

use crate::manifest::{FlatTile, LayeredTile, Position, RepresentationEntry};
use crate::{Axis, Point, PointSchema};

/// One level of detail of a tile: an owned, ordered point buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Representation {
    schema: PointSchema,
    points: Vec<Point>,
}

impl Representation {
    #[must_use]
    pub const fn new(schema: PointSchema, points: Vec<Point>) -> Self {
        Self { schema, points }
    }

    #[inline]
    #[must_use]
    pub const fn schema(&self) -> PointSchema {
        self.schema
    }

    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Give up the point buffer.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Position array, one `[x, y, z]` per point.
    #[must_use]
    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(Point::position).collect()
    }

    /// Color array parallel to [`Self::positions`], if the schema has colors.
    ///
    /// Points missing a color are written black.
    #[must_use]
    pub fn colors(&self) -> Option<Vec<[u8; 3]>> {
        self.schema.colored.then(|| {
            self.points
                .iter()
                .map(|p| p.color.unwrap_or_default().to_array())
                .collect()
        })
    }

    /// Manifest record pointing at `segment`.
    #[must_use]
    pub fn manifest_entry(&self, segment: String) -> RepresentationEntry {
        RepresentationEntry {
            points: self.len(),
            segment,
        }
    }
}

/// An axis-aligned box of the cloud and its representations.
///
/// `size` is the full edge length of the box along each axis. The box is
/// fixed at construction; only the representation list changes.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    center: [f64; 3],
    size: [f64; 3],
    representations: Vec<Representation>,
}

impl Tile {
    /// Create a tile holding its full-resolution representation.
    #[must_use]
    pub fn new(center: [f64; 3], size: [f64; 3], full_resolution: Representation) -> Self {
        Self {
            center,
            size,
            representations: vec![full_resolution],
        }
    }

    #[inline]
    #[must_use]
    pub const fn center(&self) -> [f64; 3] {
        self.center
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> [f64; 3] {
        self.size
    }

    /// Lower corner of the box.
    #[must_use]
    pub fn min_corner(&self) -> [f64; 3] {
        Axis::ALL.map(|axis| self.center[axis.index()] - self.size[axis.index()] / 2.0)
    }

    #[inline]
    #[must_use]
    pub fn representations(&self) -> &[Representation] {
        &self.representations
    }

    /// The finest representation (index 0).
    #[must_use]
    pub fn full_resolution(&self) -> Option<&Representation> {
        self.representations.first()
    }

    /// Number of points in the finest representation.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.full_resolution().map_or(0, Representation::len)
    }

    /// Append a representation after the existing ones.
    pub fn push_representation(&mut self, representation: Representation) {
        self.representations.push(representation);
    }

    /// Move every representation out, leaving the box in place.
    pub fn take_representations(&mut self) -> Vec<Representation> {
        core::mem::take(&mut self.representations)
    }

    /// Layered manifest entry.
    ///
    /// Representation `i` is listed with segment `"{segment_prefix}_{i}.{extension}"`.
    #[must_use]
    pub fn manifest_entry(&self, segment_prefix: &str, extension: &str) -> LayeredTile {
        let representations = self
            .representations
            .iter()
            .enumerate()
            .map(|(i, r)| r.manifest_entry(format!("{segment_prefix}_{i}.{extension}")))
            .collect();

        LayeredTile {
            position: Position::from(self.center),
            width: self.size[0],
            height: self.size[1],
            depth: self.size[2],
            representations,
        }
    }

    /// Flat manifest entry for a tile with a single representation.
    #[must_use]
    pub fn flat_entry(&self, segment: String) -> FlatTile {
        let [x, y, z] = self.center;
        FlatTile {
            x,
            y,
            z,
            width: self.size[0],
            height: self.size[1],
            depth: self.size[2],
            segment,
        }
    }
}
