//! Axis-aligned bounding boxes

use serde::{Deserialize, Serialize};

use crate::foundation::math::{rotate_around, Coordinate2D, Size};

/// Axis-aligned rectangle in game space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Smallest x of the box
    pub min_x: f64,
    /// Smallest y of the box
    pub min_y: f64,
    /// Width of the box
    pub width: f64,
    /// Height of the box
    pub height: f64,
}

impl BoundingBox {
    /// Create a box from its minimum corner and size
    pub const fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Self { min_x, min_y, width, height }
    }

    /// Create a box from a corner coordinate and a size
    pub fn from_corner(corner: Coordinate2D, size: Size) -> Self {
        Self::new(corner.x, corner.y, size.width, size.height)
    }

    /// Axis-aligned hull of a rectangle rotated about its centre
    pub fn rotated(self, degrees: f64) -> Self {
        if degrees % 360.0 == 0.0 {
            return self;
        }

        let centre = self.centre();
        let corners = [
            Coordinate2D::new(self.min_x, self.min_y),
            Coordinate2D::new(self.max_x(), self.min_y),
            Coordinate2D::new(self.max_x(), self.max_y()),
            Coordinate2D::new(self.min_x, self.max_y()),
        ]
        .map(|corner| rotate_around(corner, centre, degrees));

        let min_x = corners.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max);

        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Largest x of the box
    pub fn max_x(&self) -> f64 {
        self.min_x + self.width
    }

    /// Largest y of the box
    pub fn max_y(&self) -> f64 {
        self.min_y + self.height
    }

    /// Minimum corner
    pub fn min(&self) -> Coordinate2D {
        Coordinate2D::new(self.min_x, self.min_y)
    }

    /// Centre point
    pub fn centre(&self) -> Coordinate2D {
        Coordinate2D::new(self.min_x + self.width / 2.0, self.min_y + self.height / 2.0)
    }

    /// Overlap with non-zero area on both axes
    ///
    /// Boxes that merely touch along an edge or a corner do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x < other.max_x()
            && other.min_x < self.max_x()
            && self.min_y < other.max_y()
            && other.min_y < self.max_y()
    }

    /// Whether a point lies inside the box (edges included)
    pub fn contains(&self, point: Coordinate2D) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x()
            && point.y >= self.min_y
            && point.y <= self.max_y()
    }
}
