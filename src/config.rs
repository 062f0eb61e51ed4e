//! Configuration management for the posture metrics application

use crate::{
    constants::{
        DEFAULT_HEAD_LOWERED_THRESHOLD, DEFAULT_HEAD_RAISED_THRESHOLD, DEFAULT_JPEG_QUALITY,
        DEFAULT_MIN_DETECTION_CONFIDENCE, DEFAULT_POSE_INPUT_SIZE,
    },
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model configuration
    pub models: ModelConfig,

    /// Pose detection configuration
    pub detection: DetectionConfig,

    /// Posture metrics configuration
    pub metrics: MetricsConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Model file paths configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the body landmark ONNX model
    pub pose_landmarks: PathBuf,
}

/// Pose detection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum pose presence score for a body to count as detected (0.0-1.0)
    pub min_detection_confidence: f32,

    /// Landmarks scored below this visibility are treated as missing (0.0-1.0)
    pub min_visibility: f32,

    /// Square input size expected by the landmark model
    pub input_size: i32,
}

/// How knee angles are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KneeAngleMode {
    /// hip -> knee -> knee, which is always 0 degrees; kept for output compatibility
    #[default]
    Legacy,
    /// hip -> knee -> ankle
    HipKneeAnkle,
}

impl FromStr for KneeAngleMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "ankle" | "hip_knee_ankle" | "hipkneeankle" => Ok(Self::HipKneeAnkle),
            _ => Err(Error::ConfigError(format!("Unknown knee angle mode: {s}"))),
        }
    }
}

/// What to do when an elbow or knee angle cannot be measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingJointPolicy {
    /// Fail the whole frame with an incomplete landmarks error
    #[default]
    Fail,
    /// Leave the joint out of the angle set
    Omit,
}

impl FromStr for MissingJointPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "omit" => Ok(Self::Omit),
            _ => Err(Error::ConfigError(format!("Unknown missing joint policy: {s}"))),
        }
    }
}

/// Posture metrics parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Nose heights (normalized, 0 = top) below this are "raised"
    pub head_raised_threshold: f64,

    /// Nose heights above this are "lowered"
    pub head_lowered_threshold: f64,

    /// Knee angle geometry
    pub knee_angle_mode: KneeAngleMode,

    /// Handling of undetected wrists, knees and ankles
    pub missing_joints: MissingJointPolicy,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Default GUI mode
    pub gui_mode: String,

    /// Flip image horizontally
    pub flip_x: bool,

    /// Flip image vertically
    pub flip_y: bool,

    /// Draw joint angles next to the skeleton
    pub draw_angles: bool,

    /// JPEG quality for frames sent back to the viewer (0-100)
    pub jpeg_quality: i32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pose_landmarks: PathBuf::from("assets/pose_landmark.onnx"),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: DEFAULT_MIN_DETECTION_CONFIDENCE,
            min_visibility: 0.0,
            input_size: DEFAULT_POSE_INPUT_SIZE,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            head_raised_threshold: DEFAULT_HEAD_RAISED_THRESHOLD,
            head_lowered_threshold: DEFAULT_HEAD_LOWERED_THRESHOLD,
            knee_angle_mode: KneeAngleMode::default(),
            missing_joints: MissingJointPolicy::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            gui_mode: "all".to_string(),
            flip_x: false,
            flip_y: false,
            draw_angles: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        // Validate detection thresholds
        if !(0.0..=1.0).contains(&self.detection.min_detection_confidence) {
            return Err(Error::ConfigError(
                "Detection confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.min_visibility) {
            return Err(Error::ConfigError(
                "Minimum visibility must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detection.input_size <= 0 {
            return Err(Error::ConfigError("Model input size must be greater than 0".to_string()));
        }

        // Validate head thresholds
        let raised = self.metrics.head_raised_threshold;
        let lowered = self.metrics.head_lowered_threshold;
        if !(0.0..=1.0).contains(&raised) || !(0.0..=1.0).contains(&lowered) {
            return Err(Error::ConfigError(
                "Head thresholds must be between 0.0 and 1.0".to_string(),
            ));
        }
        if raised > lowered {
            return Err(Error::ConfigError(format!(
                "Head raised threshold ({raised}) must not exceed lowered threshold ({lowered})"
            )));
        }

        // Validate display settings
        if !(0..=100).contains(&self.display.jpeg_quality) {
            return Err(Error::ConfigError("JPEG quality must be between 0 and 100".to_string()));
        }

        Ok(())
    }

    /// Validate that the configured model files exist
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] naming the missing file.
    pub fn validate_models(&self) -> Result<()> {
        if !self.models.pose_landmarks.exists() {
            return Err(Error::ConfigError(format!(
                "Pose landmark model not found: {}",
                self.models.pose_landmarks.display()
            )));
        }
        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Posture Metrics Configuration

# Model paths
models:
  pose_landmarks: "assets/pose_landmark.onnx"

# Pose detection parameters
detection:
  min_detection_confidence: 0.7
  min_visibility: 0.0
  input_size: 256

# Posture metrics
metrics:
  head_raised_threshold: 0.3
  head_lowered_threshold: 0.7
  knee_angle_mode: legacy
  missing_joints: fail

# Display settings
display:
  gui_mode: "all"
  flip_x: false
  flip_y: false
  draw_angles: true
  jpeg_quality: 90
"#;
