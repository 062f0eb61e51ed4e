//! Body landmark detection.
//!
//! [`PoseDetector`] is the seam between the posture metrics and whatever
//! produces keypoints. [`OnnxPoseDetector`] runs a BlazePose-style landmark
//! model and converts its raw tensor into a [`LandmarkSet`] once, here, so
//! the rest of the crate only sees named landmarks.

use crate::{
    config::DetectionConfig,
    constants::{LANDMARK_MODEL_STRIDE, NUM_POSE_LANDMARKS},
    error::Error,
    landmarks::{Landmark, LandmarkName, LandmarkSet},
    utils::safe_cast::usize_to_i32,
    Result,
};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Anything that can turn a frame into body landmarks
pub trait PoseDetector {
    /// Detect a single body in `frame`.
    ///
    /// Returns `Ok(None)` when no body is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the detector itself fails on this frame.
    fn detect(&mut self, frame: &Mat) -> Result<Option<LandmarkSet>>;
}

/// Body landmark detector using `ONNX` Runtime
pub struct OnnxPoseDetector {
    session: Session,
    input_size: i32,
    min_detection_confidence: f32,
    min_visibility: f32,
}

impl OnnxPoseDetector {
    /// Create a new landmark detector from an `ONNX` model file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `config.input_size` is not positive
    /// - The ONNX model file cannot be loaded
    /// - The model has no inputs or outputs
    /// - The ONNX runtime environment cannot be created
    pub fn new<P: AsRef<Path>>(model_path: P, config: &DetectionConfig) -> Result<Self> {
        if config.input_size <= 0 {
            return Err(Error::InvalidInput(format!(
                "Invalid model input size: {}",
                config.input_size
            )));
        }

        log::info!(
            "Initializing OnnxPoseDetector with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("pose_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.inputs.is_empty() {
            return Err(Error::ModelInputError("Model has no inputs".to_string()));
        }
        if session.outputs.is_empty() {
            return Err(Error::ModelOutputError("Model has no outputs".to_string()));
        }

        Ok(Self {
            session,
            input_size: config.input_size,
            min_detection_confidence: config.min_detection_confidence,
            min_visibility: config.min_visibility,
        })
    }

    /// Resize, convert to RGB and normalize a frame into an NHWC tensor
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let size = usize::try_from(self.input_size)
            .map_err(|_| Error::InvalidInput(format!("Invalid model input size: {}", self.input_size)))?;
        let channels = 3;

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let mut data = vec![0.0f32; size * size * channels];
        for row in 0..size {
            for col in 0..size {
                let pixel = float_image.at_2d::<opencv::core::Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
                for ch in 0..channels {
                    data[(row * size + col) * channels + ch] = pixel[ch];
                }
            }
        }

        Array4::from_shape_vec((1, size, size, channels), data)
            .map_err(|e| Error::ModelDataFormatError(format!("Failed to create array: {e}")))
    }

    /// Run the model, returning the flat landmark tensor and the pose presence score if the model emits one
    fn forward(&self, input: Array4<f32>) -> Result<(Vec<f32>, Option<f32>)> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;
        let mut outputs = outputs.into_iter();

        let landmarks_output = outputs
            .next()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;
        let landmarks_tensor = landmarks_output.try_extract::<f32>()?;
        let landmarks_view = landmarks_tensor.view();
        let landmarks = landmarks_view
            .as_slice()
            .ok_or_else(|| Error::ModelOutputError("Failed to get output data".to_string()))?
            .to_vec();

        let presence = match outputs.next() {
            Some(output) => {
                let tensor = output.try_extract::<f32>()?;
                let view = tensor.view();
                let score = view.iter().next().copied();
                score
            }
            None => None,
        };

        Ok((landmarks, presence))
    }
}

impl PoseDetector for OnnxPoseDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Option<LandmarkSet>> {
        if frame.empty() {
            return Err(Error::InvalidInput("Cannot detect pose in an empty frame".to_string()));
        }

        let input = self.preprocess(frame)?;
        let (raw, presence) = self.forward(input)?;

        decode_landmarks(
            &raw,
            presence,
            self.input_size,
            self.min_detection_confidence,
            self.min_visibility,
        )
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Convert a raw BlazePose landmark tensor into a [`LandmarkSet`].
///
/// `raw` holds `x, y, z, visibility, presence` per landmark in input pixel
/// coordinates; visibility is a logit. Trailing auxiliary landmarks are
/// ignored. `presence` is the model's pose flag; a score below
/// `min_detection_confidence` means no body was found.
///
/// # Errors
///
/// Returns [`Error::ModelDataFormatError`] if the tensor is too short to hold
/// every body landmark.
#[allow(clippy::cast_precision_loss)] // input size is small
pub fn decode_landmarks(
    raw: &[f32],
    presence: Option<f32>,
    input_size: i32,
    min_detection_confidence: f32,
    min_visibility: f32,
) -> Result<Option<LandmarkSet>> {
    if let Some(score) = presence {
        // Some exports emit the flag as a logit
        let score = if (0.0..=1.0).contains(&score) { score } else { sigmoid(score) };
        if score < min_detection_confidence {
            log::debug!("Pose presence {score:.3} below threshold, no body detected");
            return Ok(None);
        }
    }

    let needed = NUM_POSE_LANDMARKS * LANDMARK_MODEL_STRIDE;
    if raw.len() < needed {
        return Err(Error::ModelDataFormatError(format!(
            "Expected at least {needed} landmark values, got {}",
            raw.len()
        )));
    }
    if input_size <= 0 {
        return Err(Error::InvalidInput(format!("Invalid model input size: {input_size}")));
    }

    let scale = f64::from(input_size);
    let set = LandmarkName::ALL
        .iter()
        .zip(raw.chunks_exact(LANDMARK_MODEL_STRIDE))
        .map(|(&name, values)| {
            let landmark = Landmark::with_visibility(
                f64::from(values[0]) / scale,
                f64::from(values[1]) / scale,
                sigmoid(values[3]),
            );
            (name, landmark)
        })
        .collect::<LandmarkSet>()
        .with_min_visibility(min_visibility);

    Ok(Some(set))
}
