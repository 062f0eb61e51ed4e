//! The engine holds no per-frame state, so it can score frames from many threads at once


use posture_metrics::{
    landmarks::LandmarkName,
    posture::{PostureEngine, PostureReport},
};
use std::sync::Arc;
use std::thread;
use test_helpers::{full_body, with_landmark};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_engine_and_reports_are_thread_safe() {
    assert_send_sync::<PostureEngine>();
    assert_send_sync::<PostureReport>();
}

#[test]
fn test_parallel_evaluation_matches_sequential() {
    let frames: Arc<Vec<_>> = Arc::new(
        (0..50)
            .map(|i| with_landmark(&full_body(), LandmarkName::Nose, 0.5, f64::from(i) / 50.0))
            .collect(),
    );
    let engine = PostureEngine::default();
    let expected: Vec<PostureReport> = frames
        .iter()
        .map(|frame| engine.evaluate_frame(Some(frame)).unwrap())
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let frames = Arc::clone(&frames);
            thread::spawn(move || {
                frames
                    .iter()
                    .rev()
                    .map(|frame| engine.evaluate_frame(Some(frame)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let mut reports = handle.join().unwrap();
        reports.reverse();
        assert_eq!(reports, expected);
    }
}

#[test]
fn test_scoped_threads_share_one_engine() {
    let engine = PostureEngine::default();
    let body = full_body();

    thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.evaluate_frame(Some(&body)).unwrap()))
            .collect();
        let reports: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
        assert!(reports.windows(2).all(|pair| pair[0] == pair[1]));
    });
}
