//! Posture metrics from a camera, a video file or a landmark recording.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use posture_metrics::{
    app::{build_engine, evaluate_recording, AppConfig, GuiMode, InvertMode, PostureApp, VideoSource},
    config::{Config, KneeAngleMode},
};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long, default_value = "0")]
    cam: i32,

    /// Video file to process
    #[arg(short, long)]
    video: Option<String>,

    /// Evaluate a JSON landmark recording and print one payload per frame
    #[arg(short, long)]
    landmarks: Option<PathBuf>,

    /// Body landmark ONNX model (overrides the config file)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// GUI display mode (all, cam, metrics, none)
    #[arg(short, long)]
    gui: Option<String>,

    /// Invert image (none, x, y, xy)
    #[arg(short, long, default_value = "none")]
    inv: String,

    /// Knee angle geometry (legacy, ankle)
    #[arg(short, long)]
    knee_mode: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Posture Metrics {}", env!("CARGO_PKG_VERSION"));

    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(mode) = &args.knee_mode {
        config.metrics.knee_angle_mode = mode.parse::<KneeAngleMode>()?;
    }
    if let Some(model) = args.model {
        config.models.pose_landmarks = model;
    }
    config.validate()?;

    if let Some(path) = &args.landmarks {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read landmark recording {}", path.display()))?;
        let engine = build_engine(config.metrics);
        let payloads = evaluate_recording(&json, &engine, config.detection.min_visibility)?;

        let mut stdout = std::io::stdout().lock();
        for payload in &payloads {
            writeln!(stdout, "{}", payload.to_json()?)?;
        }
        return Ok(());
    }

    config.validate_models()?;

    let gui = args.gui.unwrap_or_else(|| config.display.gui_mode.clone());
    let app_config = AppConfig {
        video_source: if let Some(video_path) = args.video {
            VideoSource::File(video_path)
        } else {
            VideoSource::Camera(args.cam)
        },
        model_path: config.models.pose_landmarks.clone(),
        detection: config.detection,
        metrics: config.metrics,
        gui_mode: match gui.as_str() {
            "all" => GuiMode::All,
            "cam" => GuiMode::Camera,
            "metrics" => GuiMode::Metrics,
            "none" => GuiMode::None,
            other => {
                warn!("Unknown GUI mode '{other}', showing all windows");
                GuiMode::All
            }
        },
        invert_mode: match args.inv.as_str() {
            "x" => InvertMode::X,
            "y" => InvertMode::Y,
            "xy" => InvertMode::XY,
            _ if config.display.flip_x && config.display.flip_y => InvertMode::XY,
            _ if config.display.flip_x => InvertMode::X,
            _ if config.display.flip_y => InvertMode::Y,
            _ => InvertMode::None,
        },
        draw_angles: config.display.draw_angles,
        jpeg_quality: config.display.jpeg_quality,
    };

    let mut app = PostureApp::new(app_config)?;
    app.run()?;

    Ok(())
}
