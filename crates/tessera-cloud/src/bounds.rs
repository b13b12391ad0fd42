//! Axis-aligned bounds.

use core::fmt;

use crate::Point;

/// A coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All axes in binning order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index into `[x, y, z]` arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        })
    }
}

/// Tight axis-aligned bounds of a set of points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Bounds {
    /// Bounds of a single point.
    #[must_use]
    pub const fn of_point(point: &Point) -> Self {
        let p = point.position();
        Self { min: p, max: p }
    }

    /// Tight bounds of `points`, or `None` when there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Self::of_point(points.next()?);
        for point in points {
            bounds.include(point);
        }
        Some(bounds)
    }

    /// Grow the bounds to contain `point`.
    pub fn include(&mut self, point: &Point) {
        for (axis, value) in point.position().into_iter().enumerate() {
            self.min[axis] = self.min[axis].min(value);
            self.max[axis] = self.max[axis].max(value);
        }
    }

    #[inline]
    #[must_use]
    pub const fn min(&self, axis: Axis) -> f64 {
        self.min[axis.index()]
    }

    #[inline]
    #[must_use]
    pub const fn max(&self, axis: Axis) -> f64 {
        self.max[axis.index()]
    }

    /// `max - min` along `axis`.
    #[inline]
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f64 {
        self.max(axis) - self.min(axis)
    }

    /// Extent along every axis.
    #[must_use]
    pub fn extents(&self) -> [f64; 3] {
        Axis::ALL.map(|axis| self.extent(axis))
    }

    /// Midpoint along every axis.
    #[must_use]
    pub fn center(&self) -> [f64; 3] {
        Axis::ALL.map(|axis| self.min(axis) + self.extent(axis) / 2.0)
    }

    /// Whether the bounds collapse to a single position.
    #[must_use]
    pub fn is_point(&self) -> bool {
        Axis::ALL.into_iter().all(|axis| self.extent(axis) == 0.0)
    }

    /// Whether `point` lies inside, boundaries included.
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        let p = point.position();
        Axis::ALL
            .into_iter()
            .all(|axis| p[axis.index()] >= self.min(axis) && p[axis.index()] <= self.max(axis))
    }
}
