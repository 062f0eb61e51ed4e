//! Checked numeric conversions for `OpenCV`'s `i32` image dimensions

use crate::{Error, Result};

/// Convert a tensor index or size to an `OpenCV` dimension
///
/// # Errors
///
/// Returns an error if the value exceeds i32::MAX
pub fn usize_to_i32(value: usize) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in i32")))
}

/// Truncate a pixel coordinate into `[min, max]`; non-finite values map to `min`
#[must_use]
#[allow(clippy::cast_possible_truncation)] // clamped before the cast
pub fn f64_to_i32_clamp(value: f64, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    (value.clamp(f64::from(min), f64::from(max)) as i32).clamp(min, max)
}
