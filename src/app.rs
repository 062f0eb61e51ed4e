//! Main application module: live capture loop and offline evaluation.

use crate::{
    config::{DetectionConfig, KneeAngleMode, MetricsConfig},
    error::Result,
    overlay::OverlayStyle,
    payload::{parse_recording, FramePayload, RecordedPayload},
    pipeline::{FramePipeline, ProcessedFrame},
    pose_detection::OnnxPoseDetector,
    posture::PostureEngine,
    utils::image_codec::encode_base64_jpeg,
};
use log::{debug, info, warn};
use opencv::{
    core::{Mat, Point, Scalar, CV_8UC3},
    highgui::{self, WINDOW_NORMAL},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const CAMERA_WINDOW: &str = "Posture Metrics";
const METRICS_WINDOW: &str = "Posture Angles";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Camera index or video file path
    pub video_source: VideoSource,
    /// Path to the body landmark model
    pub model_path: PathBuf,
    /// Detector thresholds
    pub detection: DetectionConfig,
    /// Posture engine settings
    pub metrics: MetricsConfig,
    /// GUI display mode
    pub gui_mode: GuiMode,
    /// Image inversion mode
    pub invert_mode: InvertMode,
    /// Draw joint angles on the skeleton
    pub draw_angles: bool,
    /// JPEG quality of frames in emitted payloads
    pub jpeg_quality: i32,
}

/// Video source type
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// GUI display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiMode {
    /// Annotated camera and angle panel
    All,
    /// Annotated camera only
    Camera,
    /// Angle panel only
    Metrics,
    /// Headless: one JSON payload per frame on stdout
    None,
}

/// Image inversion mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvertMode {
    /// No inversion
    None,
    /// Mirror horizontally
    X,
    /// Flip vertically
    Y,
    /// Both horizontal and vertical
    XY,
}

/// Build the posture engine, warning about the legacy knee geometry
#[must_use]
pub fn build_engine(metrics: MetricsConfig) -> PostureEngine {
    if metrics.knee_angle_mode == KneeAngleMode::Legacy {
        warn!("Legacy knee angle mode measures hip -> knee -> knee and always reports 0 degrees; use --knee-mode ankle for real knee angles");
    }
    PostureEngine::new(metrics)
}

/// Mirror or flip a frame in place
///
/// # Errors
///
/// Returns an error if `OpenCV` fails to flip the frame.
pub fn apply_inversion(frame: &mut Mat, mode: InvertMode) -> Result<()> {
    let flip_code = match mode {
        InvertMode::None => return Ok(()),
        InvertMode::X => 1,
        InvertMode::Y => 0,
        InvertMode::XY => -1,
    };
    let temp = frame.try_clone()?;
    opencv::core::flip(&temp, frame, flip_code)?;
    Ok(())
}

/// Score every frame of a landmark recording.
///
/// Frames with a detected body that lack a required landmark are logged and
/// skipped; the remaining frames are still evaluated. Each payload keeps the
/// index of its frame in the recording.
///
/// # Errors
///
/// Returns an error if the recording is not valid JSON.
pub fn evaluate_recording(json: &str, engine: &PostureEngine, min_visibility: f32) -> Result<Vec<RecordedPayload>> {
    let frames = parse_recording(json, min_visibility)?;
    info!("Evaluating {} recorded frames", frames.len());

    let mut payloads = Vec::with_capacity(frames.len());
    for (frame, landmarks) in frames.iter().enumerate() {
        match engine.evaluate_frame(landmarks.as_ref()) {
            Ok(report) => payloads.push(RecordedPayload {
                frame,
                payload: FramePayload::from_report(&report, String::new()),
            }),
            Err(e) => warn!("Skipping frame {frame}: {e}"),
        }
    }

    Ok(payloads)
}

/// Live posture application
pub struct PostureApp {
    config: AppConfig,
    pipeline: FramePipeline<OnnxPoseDetector>,
    video_capture: VideoCapture,
}

impl PostureApp {
    /// Open the video source, load the model and create GUI windows
    ///
    /// # Errors
    ///
    /// Returns an error if the video source or the model cannot be opened.
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing Posture Metrics application");

        let video_capture = match &config.video_source {
            VideoSource::Camera(index) => {
                info!("Opening camera {index}");
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;

                // Reduce buffer size for lower latency (webcam only)
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {path}");
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };

        let detector = OnnxPoseDetector::new(&config.model_path, &config.detection)?;
        let style = OverlayStyle {
            draw_angles: config.draw_angles,
            ..OverlayStyle::default()
        };
        let pipeline = FramePipeline::new(detector, build_engine(config.metrics))
            .with_style(style)
            .with_jpeg_quality(config.jpeg_quality);

        if matches!(config.gui_mode, GuiMode::All | GuiMode::Camera) {
            highgui::named_window(CAMERA_WINDOW, WINDOW_NORMAL)?;
        }
        if matches!(config.gui_mode, GuiMode::All | GuiMode::Metrics) {
            highgui::named_window(METRICS_WINDOW, WINDOW_NORMAL)?;
            highgui::resize_window(METRICS_WINDOW, 420, 300)?;
        }

        Ok(Self {
            config,
            pipeline,
            video_capture,
        })
    }

    /// Run the main application loop
    ///
    /// # Errors
    ///
    /// Returns the first error that is not confined to a single frame.
    #[allow(clippy::cast_precision_loss)]
    pub fn run(&mut self) -> Result<()> {
        info!("Starting main application loop");

        let mut frame_count = 0u64;
        let start_time = Instant::now();
        let mut last_fps_update = Instant::now();
        let mut fps = 0.0;

        loop {
            let mut frame = Mat::default();
            if !self.video_capture.read(&mut frame)? || frame.empty() {
                if matches!(self.config.video_source, VideoSource::File(_)) {
                    info!("End of video file reached");
                    break;
                }
                warn!("Failed to read frame, retrying...");
                continue;
            }

            apply_inversion(&mut frame, self.config.invert_mode)?;

            let processed = match self.pipeline.process_frame(&frame) {
                Ok(processed) => processed,
                Err(e) if e.is_frame_local() => {
                    warn!("Frame {frame_count} skipped: {e}");
                    frame_count += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            frame_count += 1;
            if last_fps_update.elapsed() >= Duration::from_secs(1) {
                fps = frame_count as f64 / start_time.elapsed().as_secs_f64();
                last_fps_update = Instant::now();
                debug!("{fps:.1} FPS");
            }

            if self.config.gui_mode == GuiMode::None {
                self.emit_payload(&processed)?;
                continue;
            }

            self.display_results(&processed, fps)?;
            let key = highgui::wait_key(1)?;
            if key == 27 || key == i32::from(b'q') {
                info!("Exit requested by user");
                break;
            }
        }

        info!("Application shutting down after {frame_count} frames");
        Ok(())
    }

    /// Write the frame's payload as one JSON line on stdout
    fn emit_payload(&self, processed: &ProcessedFrame) -> Result<()> {
        let image = encode_base64_jpeg(&processed.annotated, self.config.jpeg_quality)?;
        let payload = FramePayload::from_report(&processed.report, image);
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", payload.to_json()?)?;
        Ok(())
    }

    fn display_results(&self, processed: &ProcessedFrame, fps: f64) -> Result<()> {
        if matches!(self.config.gui_mode, GuiMode::All | GuiMode::Camera) {
            let mut display_frame = processed.annotated.try_clone()?;
            let bottom = display_frame.rows() - 10;
            imgproc::put_text(
                &mut display_frame,
                &format!("FPS: {fps:.1}"),
                Point::new(10, bottom),
                FONT_HERSHEY_SIMPLEX,
                0.6,
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                LINE_8,
                false,
            )?;
            highgui::imshow(CAMERA_WINDOW, &display_frame)?;
        }

        if matches!(self.config.gui_mode, GuiMode::All | GuiMode::Metrics) {
            let mut panel = Mat::zeros(300, 420, CV_8UC3)?.to_mat()?;
            let payload = FramePayload::from_report(&processed.report, String::new());

            let mut lines = vec![
                payload.nose_message.clone(),
                payload.shoulder_message.clone(),
                payload.head_horizontal_message.clone(),
            ];
            lines.extend(
                payload
                    .angles
                    .iter()
                    .map(|(joint, angle)| format!("{}: {angle} deg", joint.as_str())),
            );

            let mut y = 24;
            for line in &lines {
                imgproc::put_text(
                    &mut panel,
                    line,
                    Point::new(10, y),
                    FONT_HERSHEY_SIMPLEX,
                    0.5,
                    Scalar::new(255.0, 255.0, 255.0, 0.0),
                    1,
                    LINE_8,
                    false,
                )?;
                y += 24;
            }
            highgui::imshow(METRICS_WINDOW, &panel)?;
        }

        Ok(())
    }
}
