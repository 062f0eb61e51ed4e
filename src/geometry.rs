//! Planar geometry on normalized image coordinates.

use crate::constants::{EPSILON, MAX_ANGLE_DEGREES};
use serde::{Deserialize, Serialize};

/// A 2D point in normalized image coordinates (0 = left/top, 1 = right/bottom)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate, growing downwards
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_near(self, other: Self) -> bool {
        (self.x - other.x).hypot(self.y - other.y) < EPSILON
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Angle at vertex `b` between the rays `b -> a` and `b -> c`, in whole degrees.
///
/// The result is truncated towards zero and always lies in `[0, 180]`.
/// If either ray has (near) zero length the angle is undefined and `0` is
/// returned instead.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // value is clamped to [0, 180]
pub fn angle_between(a: Point, b: Point, c: Point) -> u32 {
    if a.is_near(b) || c.is_near(b) {
        return 0;
    }

    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let mut degrees = radians.abs().to_degrees();

    // Difference of two atan2 results spans up to 360 degrees
    if degrees > f64::from(MAX_ANGLE_DEGREES) {
        degrees = 360.0 - degrees;
    }

    (degrees.trunc() as u32).min(MAX_ANGLE_DEGREES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_straight_and_zero_angles() {
        let origin = Point::new(0.0, 0.0);
        assert_eq!(angle_between(Point::new(1.0, 0.0), origin, Point::new(1.0, 0.0)), 0);
        assert_eq!(angle_between(Point::new(1.0, 0.0), origin, Point::new(-1.0, 0.0)), 180);
        assert_eq!(angle_between(Point::new(1.0, 0.0), origin, Point::new(0.0, 1.0)), 90);
    }

    #[test]
    fn test_reflex_angle_is_folded() {
        // Raw atan2 difference here is 270 degrees
        let angle = angle_between(Point::new(0.0, -1.0), Point::new(0.0, 0.0), Point::new(-1.0, 0.0));
        assert_eq!(angle, 90);
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        // 45.9 degrees should truncate to 45
        let theta = 45.9_f64.to_radians();
        let angle = angle_between(
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(theta.cos(), theta.sin()),
        );
        assert_eq!(angle, 45);
    }

    #[test]
    fn test_degenerate_rays_return_zero() {
        let p = Point::new(0.5, 0.5);
        assert_eq!(angle_between(p, p, Point::new(0.9, 0.1)), 0);
        assert_eq!(angle_between(Point::new(0.9, 0.1), p, p), 0);
        assert_eq!(angle_between(p, p, p), 0);
    }

    #[test]
    fn test_point_from_tuple() {
        let p: Point = (0.25, 0.75).into();
        assert_eq!(p, Point::new(0.25, 0.75));
    }
}
