//! Posture metrics from body pose landmarks.
//!
//! Given the landmarks a pose detector found in one frame, this library
//! classifies the vertical head position, measures joint angles, scores
//! shoulder alignment and packages the result for a viewer:
//! - ONNX Runtime runs the body landmark model
//! - `OpenCV` handles capture, image codecs and the skeleton overlay
//! - The metrics themselves are pure functions of a [`landmarks::LandmarkSet`]
//!
//! # Examples
//!
//! ## Scoring landmarks
//!
//! ```
//! use posture_metrics::{
//!     landmarks::{Landmark, LandmarkName, LandmarkSet},
//!     posture::{evaluate_frame, HeadPosition},
//! };
//!
//! # fn main() -> posture_metrics::Result<()> {
//! let landmarks: LandmarkSet = [
//!     (LandmarkName::Nose, Landmark::new(0.5, 0.2)),
//!     (LandmarkName::LeftShoulder, Landmark::new(0.4, 0.5)),
//!     (LandmarkName::RightShoulder, Landmark::new(0.6, 0.5)),
//!     (LandmarkName::LeftHip, Landmark::new(0.42, 0.8)),
//!     (LandmarkName::RightHip, Landmark::new(0.58, 0.8)),
//!     (LandmarkName::LeftWrist, Landmark::new(0.3, 0.75)),
//!     (LandmarkName::RightWrist, Landmark::new(0.7, 0.75)),
//!     (LandmarkName::LeftKnee, Landmark::new(0.42, 1.0)),
//!     (LandmarkName::RightKnee, Landmark::new(0.58, 1.0)),
//! ]
//! .into_iter()
//! .collect();
//!
//! let report = evaluate_frame(Some(&landmarks))?;
//! let metrics = report.metrics().expect("body detected");
//! assert_eq!(metrics.head_position, HeadPosition::Raised);
//! assert_eq!(metrics.shoulder.message(), "Shoulders are 100% aligned");
//! # Ok(())
//! # }
//! ```
//!
//! ## Live frames
//!
//! ```no_run
//! use posture_metrics::{
//!     config::DetectionConfig, pipeline::FramePipeline, pose_detection::OnnxPoseDetector,
//!     posture::PostureEngine,
//! };
//! use opencv::{imgcodecs, highgui};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = OnnxPoseDetector::new("assets/pose_landmark.onnx", &DetectionConfig::default())?;
//! let mut pipeline = FramePipeline::new(detector, PostureEngine::default());
//!
//! let image = imgcodecs::imread("person.jpg", imgcodecs::IMREAD_COLOR)?;
//! let processed = pipeline.process_frame(&image)?;
//! if let Some(metrics) = processed.report.metrics() {
//!     println!("{} ({}%)", metrics.head_position, metrics.overall_percentage);
//! }
//! highgui::imshow("Posture", &processed.annotated)?;
//! # Ok(())
//! # }
//! ```

/// Planar points and joint angles
pub mod geometry;

/// Named body landmarks and per-frame landmark sets
pub mod landmarks;

/// Head position, joint angles and alignment scores
pub mod posture;

/// Body landmark detection
pub mod pose_detection;

/// Skeleton overlay drawing
pub mod overlay;

/// Viewer payloads and landmark recordings
pub mod payload;

/// Per-frame detect, evaluate, annotate pipeline
pub mod pipeline;

/// Utility functions for image codecs and coordinate conversions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
