//! Configuration file loading and validation

use posture_metrics::{
    config::{Config, KneeAngleMode, MissingJointPolicy, EXAMPLE_CONFIG},
    posture::PostureEngine,
    Error,
};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("posture-metrics-{}-{name}", std::process::id()))
}

#[test]
fn test_config_file_round_trip() {
    let path = temp_path("round_trip.yaml");
    let mut config = Config::default();
    config.metrics.knee_angle_mode = KneeAngleMode::HipKneeAnkle;
    config.metrics.missing_joints = MissingJointPolicy::Omit;
    config.detection.min_visibility = 0.5;
    config.display.gui_mode = "none".to_string();

    config.to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, config);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_example_config_file_loads() {
    let path = temp_path("example.yaml");
    std::fs::write(&path, EXAMPLE_CONFIG).unwrap();
    let loaded = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, Config::default());
}

#[test]
fn test_missing_and_malformed_files() {
    assert!(matches!(
        Config::from_file(temp_path("does-not-exist.yaml")),
        Err(Error::IoError(_))
    ));

    let path = temp_path("malformed.yaml");
    std::fs::write(&path, "metrics:\n  knee_angle_mode: sideways\n").unwrap();
    let result = Config::from_file(&path);
    std::fs::remove_file(&path).ok();
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn test_missing_model_is_reported() {
    let mut config = Config::default();
    config.models.pose_landmarks = temp_path("missing.onnx");
    match config.validate_models() {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("missing.onnx")),
        other => panic!("Expected ConfigError, got {other:?}"),
    }
}

#[test]
fn test_engine_uses_loaded_metrics() {
    let config: Config = serde_yaml::from_str("metrics:\n  head_raised_threshold: 0.1\n").unwrap();
    let engine = PostureEngine::new(config.metrics);
    assert!((engine.config().head_raised_threshold - 0.1).abs() < f64::EPSILON);
    assert_eq!(engine.config().knee_angle_mode, KneeAngleMode::Legacy);
}
