//! Frame pipeline: detect, score, annotate and package a single frame.

use crate::{
    constants::DEFAULT_JPEG_QUALITY,
    landmarks::LandmarkSet,
    overlay::{self, OverlayStyle},
    payload::FramePayload,
    pose_detection::PoseDetector,
    posture::{PostureEngine, PostureReport},
    utils::image_codec::{decode_base64_image, encode_base64_jpeg},
    Result,
};
use opencv::{core::Mat, prelude::*};

/// Everything produced for one frame
#[derive(Debug)]
pub struct ProcessedFrame {
    /// Landmarks as detected, `None` if no body was found
    pub landmarks: Option<LandmarkSet>,
    /// Posture metrics for the frame
    pub report: PostureReport,
    /// Copy of the input frame with the overlay drawn on it
    pub annotated: Mat,
}

/// Owns the detector handle and runs frames through the posture engine
pub struct FramePipeline<D: PoseDetector> {
    detector: D,
    engine: PostureEngine,
    style: OverlayStyle,
    jpeg_quality: i32,
}

impl<D: PoseDetector> FramePipeline<D> {
    /// Create a pipeline around a detector
    pub fn new(detector: D, engine: PostureEngine) -> Self {
        Self {
            detector,
            engine,
            style: OverlayStyle::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Use a different overlay style
    #[must_use]
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// JPEG quality for [`Self::process_encoded`]
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: i32) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Access the detector, e.g. to inspect or reconfigure it between frames
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Detect, evaluate and annotate a decoded frame
    ///
    /// # Errors
    ///
    /// Returns an error if detection fails, if a detected body lacks a
    /// required landmark, or if drawing fails.
    pub fn process_frame(&mut self, frame: &Mat) -> Result<ProcessedFrame> {
        let landmarks = self.detector.detect(frame)?;
        let report = self.engine.evaluate_frame(landmarks.as_ref())?;

        if let Some(metrics) = report.metrics() {
            log::debug!(
                "{} | {} | overall {}%",
                metrics.head_position,
                metrics.shoulder.message(),
                metrics.overall_percentage
            );
        } else {
            log::debug!("No body detected");
        }

        let mut annotated = frame.try_clone()?;
        overlay::render(&mut annotated, landmarks.as_ref(), &report, &self.style)?;

        Ok(ProcessedFrame {
            landmarks,
            report,
            annotated,
        })
    }

    /// Full round trip for a base64 encoded frame from the viewer
    ///
    /// # Errors
    ///
    /// Returns `Error::ImageDecode` if the image cannot be decoded, or any
    /// error from [`Self::process_frame`] or the JPEG encoder.
    pub fn process_encoded(&mut self, image: &str) -> Result<FramePayload> {
        let frame = decode_base64_image(image)?;
        let processed = self.process_frame(&frame)?;
        let encoded = encode_base64_jpeg(&processed.annotated, self.jpeg_quality)?;
        Ok(FramePayload::from_report(&processed.report, encoded))
    }
}
