//! Math utilities and types
//!
//! Provides the 2D value types the engine is built on. Vector arithmetic is
//! delegated to nalgebra; the engine types stay small `Copy` values so that
//! entities can hand them around freely.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

pub use nalgebra::Vector2;

/// 2D vector type used for engine math
pub type Vec2 = Vector2<f64>;

/// An immutable 2D point
///
/// The bearing returned by [`Coordinate2D::angle_to`] is measured clockwise
/// with "up" `(0, 1)` as zero degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate2D {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Coordinate2D {
    /// The origin `(0, 0)`
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new coordinate
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return the sum of both coordinates
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::from(self.to_vector() + other.to_vector())
    }

    /// Return this coordinate minus `other`
    #[must_use]
    pub fn subtract(self, other: Self) -> Self {
        Self::from(self.to_vector() - other.to_vector())
    }

    /// Euclidean distance to another coordinate
    pub fn distance(self, other: Self) -> f64 {
        (other.to_vector() - self.to_vector()).norm()
    }

    /// Bearing in degrees (0..360) from this coordinate to `coordinate`
    ///
    /// Identical points yield 0. Otherwise the unsigned angle between the
    /// normalized delta and "up" is taken, and reflected across 360 when the
    /// delta points to the left.
    pub fn angle_to(self, coordinate: Self) -> f64 {
        if self == coordinate {
            return 0.0;
        }

        let delta = coordinate.to_vector() - self.to_vector();
        let up = Vec2::new(0.0, 1.0);
        let angle = up.angle(&delta.normalize()).to_degrees();

        if delta.x < 0.0 {
            360.0 - angle
        } else {
            angle
        }
    }

    /// View this coordinate as a nalgebra vector
    pub fn to_vector(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for Coordinate2D {
    fn from(vector: Vec2) -> Self {
        Self::new(vector.x, vector.y)
    }
}

impl Add for Coordinate2D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::add(self, rhs)
    }
}

impl Sub for Coordinate2D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.subtract(rhs)
    }
}

/// Width and height of an entity or a game area
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl Size {
    /// Create a new size
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A square size
    pub const fn square(side: f64) -> Self {
        Self::new(side, side)
    }

    /// Whether either dimension is zero (or negative)
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Rotate `point` around `pivot` by `degrees` (clockwise in screen space)
pub fn rotate_around(point: Coordinate2D, pivot: Coordinate2D, degrees: f64) -> Coordinate2D {
    let rotation = nalgebra::Rotation2::new(degrees.to_radians());
    let offset = rotation * (point.to_vector() - pivot.to_vector());
    Coordinate2D::from(pivot.to_vector() + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_angle_to_self_is_zero() {
        let c = Coordinate2D::new(3.0, 4.0);
        assert_eq!(c.angle_to(c), 0.0);
    }

    #[test]
    fn test_angle_to_cardinal_directions() {
        let origin = Coordinate2D::new(10.0, 10.0);

        let above = Coordinate2D::new(10.0, 20.0);
        let right = Coordinate2D::new(20.0, 10.0);
        let below = Coordinate2D::new(10.0, 0.0);
        let left = Coordinate2D::new(0.0, 10.0);

        assert_relative_eq!(origin.angle_to(above), 0.0, epsilon = 1e-9);
        assert_relative_eq!(origin.angle_to(right), 90.0, epsilon = 1e-9);
        assert_relative_eq!(origin.angle_to(below), 180.0, epsilon = 1e-9);
        assert_relative_eq!(origin.angle_to(left), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn test_angle_to_diagonals() {
        let origin = Coordinate2D::ORIGIN;
        assert_relative_eq!(origin.angle_to(Coordinate2D::new(1.0, 1.0)), 45.0, epsilon = 1e-9);
        assert_relative_eq!(origin.angle_to(Coordinate2D::new(-1.0, 1.0)), 315.0, epsilon = 1e-9);
        assert_relative_eq!(origin.angle_to(Coordinate2D::new(-1.0, -1.0)), 225.0, epsilon = 1e-9);
    }

    #[test]
    fn test_add_and_subtract() {
        let a = Coordinate2D::new(1.0, 2.0);
        let b = Coordinate2D::new(3.5, -1.0);

        assert_eq!(a.add(b), Coordinate2D::new(4.5, 1.0));
        assert_eq!(a + b, Coordinate2D::new(4.5, 1.0));
        assert_eq!(b - a, Coordinate2D::new(2.5, -3.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let rotated = rotate_around(Coordinate2D::new(1.0, 0.0), Coordinate2D::ORIGIN, 90.0);
        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-9);
    }
}
