//! Utility functions for image handling and coordinate transformations.

pub mod image_codec;
pub mod safe_cast;

use crate::{geometry::Point, Error, Result};
use opencv::core::Point as PixelPoint;
use safe_cast::f64_to_i32_clamp;

/// Map a normalized point onto pixel coordinates of a `width` x `height` image.
///
/// Coordinates outside the frame are clamped to its border.
///
/// # Errors
///
/// Returns an error if the image dimensions are not positive.
pub fn to_pixel(point: Point, width: i32, height: i32) -> Result<PixelPoint> {
    if width <= 0 || height <= 0 {
        return Err(Error::InvalidInput(format!(
            "Invalid image dimensions: {width}x{height}"
        )));
    }

    Ok(PixelPoint::new(
        f64_to_i32_clamp(point.x * f64::from(width), 0, width - 1),
        f64_to_i32_clamp(point.y * f64::from(height), 0, height - 1),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pixel_scales_normalized_coordinates() {
        let p = to_pixel(Point::new(0.5, 0.25), 640, 480).unwrap();
        assert_eq!((p.x, p.y), (320, 120));
    }

    #[test]
    fn test_to_pixel_clamps_to_frame() {
        let p = to_pixel(Point::new(1.2, -0.3), 640, 480).unwrap();
        assert_eq!((p.x, p.y), (639, 0));

        let p = to_pixel(Point::new(1.0, 1.0), 640, 480).unwrap();
        assert_eq!((p.x, p.y), (639, 479));
    }

    #[test]
    fn test_to_pixel_rejects_empty_image() {
        assert!(to_pixel(Point::new(0.5, 0.5), 0, 480).is_err());
        assert!(to_pixel(Point::new(0.5, 0.5), 640, -1).is_err());
    }
}
