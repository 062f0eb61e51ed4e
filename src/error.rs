//! Error types for the posture metrics library.

use crate::landmarks::LandmarkName;
use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime inference failed
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A body was detected but a landmark needed by a computation is missing
    /// or below the visibility threshold
    #[error("Incomplete landmarks: {landmark} is missing or not visible")]
    IncompleteLandmarks {
        /// The landmark the computation asked for
        landmark: LandmarkName,
    },

    /// Incoming frame could not be decoded into an image
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model input configuration error
    #[error("Model input error: {0}")]
    ModelInputError(String),

    /// Model output processing error
    #[error("Model output error: {0}")]
    ModelOutputError(String),

    /// Model data shape or format error
    #[error("Model data format error: {0}")]
    ModelDataFormatError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

impl Error {
    /// Whether this error only concerns a single frame, so the caller can
    /// keep processing the next one.
    #[must_use]
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            Self::IncompleteLandmarks { .. } | Self::ImageDecode(_) | Self::InvalidInput(_)
        )
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
