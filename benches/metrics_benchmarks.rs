//! Benchmarks for the per-frame posture path

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use opencv::core::{Mat, Scalar, CV_8UC3};
use posture_metrics::{
    config::{KneeAngleMode, MetricsConfig},
    constants::{LANDMARK_MODEL_STRIDE, NUM_POSE_LANDMARKS},
    geometry::{angle_between, Point},
    landmarks::{Landmark, LandmarkName, LandmarkSet},
    overlay::{render, OverlayStyle},
    payload::FramePayload,
    pose_detection::decode_landmarks,
    posture::PostureEngine,
    utils::image_codec::encode_base64_jpeg,
};
use std::time::Duration;

fn body() -> LandmarkSet {
    [
        (LandmarkName::Nose, Landmark::new(0.5, 0.2)),
        (LandmarkName::LeftShoulder, Landmark::new(0.4, 0.5)),
        (LandmarkName::RightShoulder, Landmark::new(0.6, 0.5)),
        (LandmarkName::LeftHip, Landmark::new(0.42, 0.8)),
        (LandmarkName::RightHip, Landmark::new(0.58, 0.8)),
        (LandmarkName::LeftWrist, Landmark::new(0.3, 0.75)),
        (LandmarkName::RightWrist, Landmark::new(0.7, 0.75)),
        (LandmarkName::LeftKnee, Landmark::new(0.42, 1.0)),
        (LandmarkName::RightKnee, Landmark::new(0.58, 1.0)),
        (LandmarkName::LeftAnkle, Landmark::new(0.45, 1.2)),
        (LandmarkName::RightAnkle, Landmark::new(0.55, 1.2)),
    ]
    .into_iter()
    .collect()
}

fn bench_angle_between(c: &mut Criterion) {
    let points: Vec<(Point, Point, Point)> = (0..1000)
        .map(|i| {
            let t = f64::from(i) * 0.01;
            (
                Point::new(t.cos(), t.sin()),
                Point::new(0.0, 0.0),
                Point::new((t * 1.7).sin(), (t * 0.3).cos()),
            )
        })
        .collect();

    c.bench_function("angle_between_1000", |b| {
        b.iter(|| {
            for &(a, v, c) in &points {
                black_box(angle_between(a, v, c));
            }
        });
    });
}

fn bench_evaluate_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_frame");
    let set = body();

    for (name, mode) in [("legacy", KneeAngleMode::Legacy), ("hip_knee_ankle", KneeAngleMode::HipKneeAnkle)] {
        let engine = PostureEngine::new(MetricsConfig {
            knee_angle_mode: mode,
            ..MetricsConfig::default()
        });
        group.bench_with_input(BenchmarkId::new("knee_mode", name), &set, |b, set| {
            b.iter(|| black_box(engine.evaluate_frame(Some(set)).unwrap()));
        });
    }

    group.finish();
}

#[allow(clippy::cast_precision_loss)]
fn bench_decode_landmarks(c: &mut Criterion) {
    let raw: Vec<f32> = (0..NUM_POSE_LANDMARKS * LANDMARK_MODEL_STRIDE)
        .map(|i| (i % 256) as f32)
        .collect();

    c.bench_function("decode_landmarks", |b| {
        b.iter(|| black_box(decode_landmarks(&raw, Some(0.9), 256, 0.7, 0.5).unwrap()));
    });
}

fn bench_overlay_and_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_output");
    group.measurement_time(Duration::from_secs(10));

    let set = body();
    let report = PostureEngine::default().evaluate_frame(Some(&set)).unwrap();
    let frame = Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(50.0)).unwrap();
    let style = OverlayStyle::default();

    group.bench_function("render_overlay", |b| {
        b.iter(|| {
            let mut annotated = frame.clone();
            render(&mut annotated, Some(&set), &report, &style).unwrap();
            black_box(annotated);
        });
    });

    group.bench_function("encode_payload", |b| {
        b.iter(|| {
            let image = encode_base64_jpeg(&frame, 90).unwrap();
            black_box(FramePayload::from_report(&report, image).to_json().unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_angle_between,
    bench_evaluate_frame,
    bench_decode_landmarks,
    bench_overlay_and_payload
);
criterion_main!(benches);
