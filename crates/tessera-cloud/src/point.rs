//! Points and point clouds.

use core::cmp::Ordering;

use crate::{Axis, Bounds};

/// 8-bit color channels of a point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Channels as `[red, green, blue]`.
    #[must_use]
    pub const fn to_array(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self { red, green, blue }
    }
}

/// A single point: a position and optional color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub color: Option<Rgb>,
}

impl Point {
    /// Create an uncolored point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            color: None,
        }
    }

    /// Attach a color.
    #[must_use]
    pub const fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Position as `[x, y, z]`.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Coordinate along `axis`.
    #[inline]
    #[must_use]
    pub const fn coord(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Total order: x, then y, then z, then color (uncolored first).
    ///
    /// Uses IEEE 754 `totalOrder`, so NaN coordinates still sort
    /// deterministically.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.z.total_cmp(&other.z))
            .then_with(|| self.color.cmp(&other.color))
    }
}

/// Scalar type positions were stored with on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Precision {
    /// 32-bit float.
    Single,
    /// 64-bit float.
    #[default]
    Double,
}

/// Which attributes every point of a buffer carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PointSchema {
    pub precision: Precision,
    pub colored: bool,
}

impl PointSchema {
    #[must_use]
    pub const fn new(precision: Precision, colored: bool) -> Self {
        Self { precision, colored }
    }

    /// Double precision, colored only when every point has a color.
    #[must_use]
    pub fn infer(points: &[Point]) -> Self {
        Self {
            precision: Precision::Double,
            colored: !points.is_empty() && points.iter().all(|p| p.color.is_some()),
        }
    }
}

/// An in-memory point cloud, read-only once loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    schema: PointSchema,
    points: Vec<Point>,
}

impl PointCloud {
    /// Create a cloud, inferring the schema from the points.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            schema: PointSchema::infer(&points),
            points,
        }
    }

    /// Create a cloud with an explicit schema.
    #[must_use]
    pub const fn with_schema(schema: PointSchema, points: Vec<Point>) -> Self {
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

    /// Tight bounds, or `None` for an empty cloud.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }
}
