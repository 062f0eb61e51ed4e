//! Skeleton and posture overlay drawn onto frames for display.

use crate::{
    landmarks::{LandmarkName, LandmarkSet},
    posture::{AngleMeasurements, Joint, PostureReport},
    utils::to_pixel,
    Result,
};
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8, LINE_AA},
    prelude::*,
};

/// Pairs of landmarks joined by a bone in the skeleton overlay
pub const POSE_CONNECTIONS: [(LandmarkName, LandmarkName); 35] = {
    use LandmarkName::*;
    [
        (Nose, LeftEyeInner),
        (LeftEyeInner, LeftEye),
        (LeftEye, LeftEyeOuter),
        (LeftEyeOuter, LeftEar),
        (Nose, RightEyeInner),
        (RightEyeInner, RightEye),
        (RightEye, RightEyeOuter),
        (RightEyeOuter, RightEar),
        (MouthLeft, MouthRight),
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (LeftWrist, LeftPinky),
        (LeftWrist, LeftIndex),
        (LeftWrist, LeftThumb),
        (LeftPinky, LeftIndex),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (RightWrist, RightPinky),
        (RightWrist, RightIndex),
        (RightWrist, RightThumb),
        (RightPinky, RightIndex),
        (LeftShoulder, LeftHip),
        (RightShoulder, RightHip),
        (LeftHip, RightHip),
        (LeftHip, LeftKnee),
        (LeftKnee, LeftAnkle),
        (LeftAnkle, LeftHeel),
        (LeftHeel, LeftFootIndex),
        (LeftAnkle, LeftFootIndex),
        (RightHip, RightKnee),
        (RightKnee, RightAnkle),
        (RightAnkle, RightHeel),
        (RightHeel, RightFootIndex),
        (RightAnkle, RightFootIndex),
    ]
};

/// Colors and sizes used for the overlay
#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    /// Landmark dot color (BGR)
    pub landmark_color: Scalar,
    /// Bone line color (BGR)
    pub connection_color: Scalar,
    /// Text color (BGR)
    pub text_color: Scalar,
    /// Line thickness in pixels
    pub thickness: i32,
    /// Landmark dot radius in pixels
    pub circle_radius: i32,
    /// Write joint angles next to their vertex
    pub draw_angles: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            landmark_color: Scalar::new(245.0, 117.0, 66.0, 0.0),
            connection_color: Scalar::new(245.0, 66.0, 230.0, 0.0),
            text_color: Scalar::new(255.0, 255.0, 255.0, 0.0),
            thickness: 2,
            circle_radius: 2,
            draw_angles: true,
        }
    }
}

/// Draw bones and landmark dots for every visible landmark
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails.
pub fn draw_skeleton(frame: &mut Mat, landmarks: &LandmarkSet, style: &OverlayStyle) -> Result<()> {
    let (width, height) = (frame.cols(), frame.rows());

    for (from, to) in POSE_CONNECTIONS {
        let (Some(a), Some(b)) = (landmarks.try_point(from), landmarks.try_point(to)) else {
            continue;
        };
        imgproc::line(
            frame,
            to_pixel(a, width, height)?,
            to_pixel(b, width, height)?,
            style.connection_color,
            style.thickness,
            LINE_AA,
            0,
        )?;
    }

    for (name, _) in landmarks.iter() {
        if let Some(point) = landmarks.try_point(name) {
            imgproc::circle(
                frame,
                to_pixel(point, width, height)?,
                style.circle_radius,
                style.landmark_color,
                style.thickness,
                LINE_8,
                0,
            )?;
        }
    }

    Ok(())
}

/// Write each measured angle next to the joint it was measured at
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails.
pub fn draw_angles(
    frame: &mut Mat,
    landmarks: &LandmarkSet,
    angles: &AngleMeasurements,
    style: &OverlayStyle,
) -> Result<()> {
    let (width, height) = (frame.cols(), frame.rows());

    for (joint, angle) in angles.iter() {
        let Some(vertex) = landmarks.try_point(joint.vertex()) else {
            continue;
        };
        let anchor = to_pixel(vertex, width, height)?;
        // Elbow and shoulder share a vertex; stack them
        let dy = match joint {
            Joint::LeftElbow | Joint::RightElbow => 16,
            _ => 0,
        };
        imgproc::put_text(
            frame,
            &angle.to_string(),
            Point::new(anchor.x + 6, anchor.y - 6 + dy),
            FONT_HERSHEY_SIMPLEX,
            0.45,
            style.text_color,
            1,
            LINE_AA,
            false,
        )?;
    }

    Ok(())
}

/// Draw the posture messages in the top-left corner
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails.
pub fn draw_report(frame: &mut Mat, report: &PostureReport, style: &OverlayStyle) -> Result<()> {
    let lines = match report.metrics() {
        None => vec!["No body detected".to_string()],
        Some(metrics) => vec![
            metrics.head_position.message().to_string(),
            metrics.shoulder.message(),
            metrics.head_horizontal.position.message().to_string(),
            format!("Overall: {}%", metrics.overall_percentage),
        ],
    };

    let mut y = 24;
    for line in &lines {
        imgproc::put_text(
            frame,
            line,
            Point::new(10, y),
            FONT_HERSHEY_SIMPLEX,
            0.6,
            style.text_color,
            2,
            LINE_8,
            false,
        )?;
        y += 22;
    }

    Ok(())
}

/// Full overlay: skeleton, optional angle labels and report text
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails.
pub fn render(
    frame: &mut Mat,
    landmarks: Option<&LandmarkSet>,
    report: &PostureReport,
    style: &OverlayStyle,
) -> Result<()> {
    if let Some(landmarks) = landmarks {
        draw_skeleton(frame, landmarks, style)?;
        if let (true, Some(metrics)) = (style.draw_angles, report.metrics()) {
            draw_angles(frame, landmarks, &metrics.angles, style)?;
        }
    }
    draw_report(frame, report, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{landmarks::Landmark, posture::evaluate_frame};
    use opencv::core::{Vec3b, CV_8UC3};

    fn blank_frame() -> Mat {
        Mat::new_rows_cols_with_default(120, 160, CV_8UC3, Scalar::default()).unwrap()
    }

    fn count_nonzero_pixels(frame: &Mat) -> usize {
        let mut count = 0;
        for row in 0..frame.rows() {
            for col in 0..frame.cols() {
                let px = frame.at_2d::<Vec3b>(row, col).unwrap();
                if px[0] != 0 || px[1] != 0 || px[2] != 0 {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_connections_are_unique() {
        for (i, a) in POSE_CONNECTIONS.iter().enumerate() {
            assert_ne!(a.0, a.1);
            for b in &POSE_CONNECTIONS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_skeleton_draws_only_visible_landmarks() {
        let mut frame = blank_frame();
        let hidden: LandmarkSet = [
            (LandmarkName::LeftShoulder, Landmark::with_visibility(0.3, 0.5, 0.1)),
            (LandmarkName::RightShoulder, Landmark::with_visibility(0.7, 0.5, 0.1)),
        ]
        .into_iter()
        .collect::<LandmarkSet>()
        .with_min_visibility(0.5);

        draw_skeleton(&mut frame, &hidden, &OverlayStyle::default()).unwrap();
        assert_eq!(count_nonzero_pixels(&frame), 0);

        let visible = hidden.with_min_visibility(0.0);
        draw_skeleton(&mut frame, &visible, &OverlayStyle::default()).unwrap();
        assert!(count_nonzero_pixels(&frame) > 0);
    }

    #[test]
    fn test_render_without_detection_only_writes_text() {
        let mut frame = blank_frame();
        let report = evaluate_frame(None).unwrap();
        render(&mut frame, None, &report, &OverlayStyle::default()).unwrap();
        assert!(count_nonzero_pixels(&frame) > 0);
    }
}
