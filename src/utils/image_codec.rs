//! Base64 JPEG frames as exchanged with the viewer.

use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use opencv::{
    core::{Mat, Vector},
    imgcodecs,
    prelude::*,
};

/// Decode a base64 encoded image (JPEG, PNG, ...) into a BGR frame
///
/// A `data:image/...;base64,` prefix, as sent by browsers, is accepted.
///
/// # Errors
///
/// Returns [`Error::ImageDecode`] if the payload is not valid base64 or not
/// a decodable image.
pub fn decode_base64_image(data: &str) -> Result<Mat> {
    let encoded = data
        .split_once(";base64,")
        .map_or(data, |(_, payload)| payload)
        .trim();

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| Error::ImageDecode(format!("Invalid base64 payload: {e}")))?;
    if bytes.is_empty() {
        return Err(Error::ImageDecode("Empty image payload".to_string()));
    }

    let buffer = Vector::<u8>::from_slice(&bytes);
    let frame = imgcodecs::imdecode(&buffer, imgcodecs::IMREAD_COLOR)?;
    if frame.empty() {
        return Err(Error::ImageDecode("Payload is not a supported image".to_string()));
    }

    Ok(frame)
}

/// Encode a frame as JPEG and wrap it in base64
///
/// # Errors
///
/// Returns an error if the frame is empty or `OpenCV` fails to encode it.
pub fn encode_base64_jpeg(frame: &Mat, quality: i32) -> Result<String> {
    if frame.empty() {
        return Err(Error::InvalidInput("Cannot encode an empty frame".to_string()));
    }

    let mut buffer = Vector::<u8>::new();
    let params = Vector::<i32>::from_slice(&[imgcodecs::IMWRITE_JPEG_QUALITY, quality.clamp(0, 100)]);
    if !imgcodecs::imencode(".jpg", frame, &mut buffer, &params)? {
        return Err(Error::InvalidInput("JPEG encoding failed".to_string()));
    }

    Ok(STANDARD.encode(buffer.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    #[test]
    fn test_encode_then_decode_keeps_dimensions() {
        let frame = Mat::new_rows_cols_with_default(48, 64, CV_8UC3, Scalar::new(10.0, 120.0, 200.0, 0.0)).unwrap();

        let encoded = encode_base64_jpeg(&frame, 90).unwrap();
        let decoded = decode_base64_image(&encoded).unwrap();
        assert_eq!(decoded.rows(), 48);
        assert_eq!(decoded.cols(), 64);

        let with_prefix = format!("data:image/jpeg;base64,{encoded}");
        assert_eq!(decode_base64_image(&with_prefix).unwrap().cols(), 64);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_base64_image("not base64!"), Err(Error::ImageDecode(_))));
        assert!(matches!(decode_base64_image(""), Err(Error::ImageDecode(_))));
        // Valid base64, but not an image
        let text = STANDARD.encode(b"hello world");
        assert!(decode_base64_image(&text).is_err());
    }

    #[test]
    fn test_encode_rejects_empty_frame() {
        assert!(encode_base64_jpeg(&Mat::default(), 90).is_err());
    }
}
