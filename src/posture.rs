//! Posture metrics computed from a single frame's body landmarks.
//!
//! Every evaluation is a pure function of the landmarks it is given: the
//! engine keeps no per-frame state, so frames from any number of streams can
//! be scored concurrently.

use crate::{
    config::{KneeAngleMode, MetricsConfig, MissingJointPolicy},
    constants::{EPSILON, FULL_PERCENTAGE, HEAD_CENTERED_TOLERANCE},
    geometry::{angle_between, Point},
    landmarks::{LandmarkName, LandmarkSet},
    Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vertical head position derived from the nose height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadPosition {
    /// Nose in the upper part of the frame
    Raised,
    /// Nose in the lower part of the frame
    Lowered,
    /// Anything in between
    Neutral,
}

impl HeadPosition {
    /// Human readable message sent to the viewer
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Raised => "Head is raised",
            Self::Lowered => "Head is lowered",
            Self::Neutral => "Head is in a neutral position",
        }
    }
}

impl fmt::Display for HeadPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Joints an angle is measured at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftKnee,
    RightKnee,
    Head,
}

impl Joint {
    /// Every tracked joint
    pub const ALL: [Self; 7] = [
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftKnee,
        Self::RightKnee,
        Self::Head,
    ];

    /// Key used in the transport payload
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::Head => "head",
        }
    }

    /// Landmark the angle is measured at
    #[must_use]
    pub const fn vertex(self) -> LandmarkName {
        match self {
            Self::LeftShoulder | Self::LeftElbow => LandmarkName::LeftShoulder,
            Self::RightShoulder | Self::RightElbow => LandmarkName::RightShoulder,
            Self::LeftKnee => LandmarkName::LeftKnee,
            Self::RightKnee => LandmarkName::RightKnee,
            Self::Head => LandmarkName::Nose,
        }
    }
}

/// Joint angles for one frame, in whole degrees within `[0, 180]`.
///
/// Shoulder and head angles are always present. Elbow and knee angles are
/// `None` only when the engine runs with [`MissingJointPolicy::Omit`] and the
/// wrist/knee/ankle landmarks were not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AngleMeasurements {
    pub left_shoulder: u32,
    pub right_shoulder: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_elbow: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_elbow: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_knee: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_knee: Option<u32>,
    pub head: u32,
}

impl AngleMeasurements {
    /// Angle at the given joint, if it was measured
    #[must_use]
    pub const fn get(&self, joint: Joint) -> Option<u32> {
        match joint {
            Joint::LeftShoulder => Some(self.left_shoulder),
            Joint::RightShoulder => Some(self.right_shoulder),
            Joint::LeftElbow => self.left_elbow,
            Joint::RightElbow => self.right_elbow,
            Joint::LeftKnee => self.left_knee,
            Joint::RightKnee => self.right_knee,
            Joint::Head => Some(self.head),
        }
    }

    /// Measured joints and their angles
    pub fn iter(&self) -> impl Iterator<Item = (Joint, u32)> + '_ {
        Joint::ALL
            .into_iter()
            .filter_map(move |joint| self.get(joint).map(|angle| (joint, angle)))
    }
}

/// How evenly the shoulders sit, as a percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoulderAlignment {
    /// 100 when both shoulder angles are identical
    pub percentage: u32,
}

impl ShoulderAlignment {
    /// Human readable message with the embedded percentage
    #[must_use]
    pub fn message(&self) -> String {
        format!("Shoulders are {}% aligned", self.percentage)
    }

    /// No difference at all between the shoulder angles
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.percentage == FULL_PERCENTAGE
    }
}

/// Horizontal head placement relative to the shoulder midpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadHorizontal {
    /// Nose roughly above the shoulder midpoint
    Centered,
    /// Nose towards the left edge of the image
    ShiftedLeft,
    /// Nose towards the right edge of the image
    ShiftedRight,
}

impl HeadHorizontal {
    /// Human readable message sent to the viewer
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Centered => "Head is centered over the shoulders",
            Self::ShiftedLeft => "Head is shifted to the left",
            Self::ShiftedRight => "Head is shifted to the right",
        }
    }
}

/// Horizontal head alignment with its score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadHorizontalAlignment {
    /// Classified placement
    pub position: HeadHorizontal,
    /// 100 when the nose is exactly above the shoulder midpoint.
    ///
    /// Stacked shoulders (a side view) give no width to score against, so the
    /// head is reported `Centered` with 0.
    pub percentage: u32,
}

/// Fully populated metrics for a frame with a detected body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureMetrics {
    pub head_position: HeadPosition,
    pub shoulder: ShoulderAlignment,
    pub angles: AngleMeasurements,
    pub overall_percentage: u32,
    pub head_horizontal: HeadHorizontalAlignment,
}

/// Result of evaluating one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "metrics", rename_all = "snake_case")]
pub enum PostureReport {
    /// No body in the frame; a normal outcome
    NoDetection,
    /// A body was found and scored
    Detected(PostureMetrics),
}

impl PostureReport {
    /// Metrics if a body was detected
    #[must_use]
    pub const fn metrics(&self) -> Option<&PostureMetrics> {
        match self {
            Self::NoDetection => None,
            Self::Detected(metrics) => Some(metrics),
        }
    }

    /// Whether a body was detected
    #[must_use]
    pub const fn is_detected(&self) -> bool {
        matches!(self, Self::Detected(_))
    }
}

/// Stateless posture scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureEngine {
    config: MetricsConfig,
}

impl Default for PostureEngine {
    fn default() -> Self {
        Self::new(MetricsConfig::default())
    }
}

impl PostureEngine {
    /// Create an engine with the given thresholds and policies
    #[must_use]
    pub fn new(config: MetricsConfig) -> Self {
        log::debug!(
            "Initializing PostureEngine (head thresholds {:.2}/{:.2}, knees {:?}, missing joints {:?})",
            config.head_raised_threshold,
            config.head_lowered_threshold,
            config.knee_angle_mode,
            config.missing_joints
        );
        Self { config }
    }

    /// Configuration the engine was built with
    #[must_use]
    pub const fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Classify the vertical head position from the nose height
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompleteLandmarks` if the nose is not available.
    pub fn classify_head_position(&self, landmarks: &LandmarkSet) -> Result<HeadPosition> {
        let nose = landmarks.point(LandmarkName::Nose)?;
        Ok(if nose.y < self.config.head_raised_threshold {
            HeadPosition::Raised
        } else if nose.y > self.config.head_lowered_threshold {
            HeadPosition::Lowered
        } else {
            HeadPosition::Neutral
        })
    }

    /// Measure all tracked joint angles
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompleteLandmarks` for the first landmark that is
    /// needed but missing. With [`MissingJointPolicy::Omit`] only the
    /// shoulders, hips and nose are required.
    pub fn compute_angles(&self, landmarks: &LandmarkSet) -> Result<AngleMeasurements> {
        use LandmarkName::{LeftHip, LeftShoulder, LeftWrist, Nose, RightHip, RightShoulder, RightWrist};

        let left_shoulder = landmarks.point(LeftShoulder)?;
        let right_shoulder = landmarks.point(RightShoulder)?;
        let left_hip = landmarks.point(LeftHip)?;
        let right_hip = landmarks.point(RightHip)?;
        let nose = landmarks.point(Nose)?;

        let left_elbow = self
            .optional_point(landmarks, LeftWrist)?
            .map(|wrist| angle_between(left_hip, left_shoulder, wrist));
        let right_elbow = self
            .optional_point(landmarks, RightWrist)?
            .map(|wrist| angle_between(right_hip, right_shoulder, wrist));

        Ok(AngleMeasurements {
            left_shoulder: angle_between(left_hip, left_shoulder, right_shoulder),
            right_shoulder: angle_between(right_hip, right_shoulder, left_shoulder),
            left_elbow,
            right_elbow,
            left_knee: self.knee_angle(landmarks, Side::Left)?,
            right_knee: self.knee_angle(landmarks, Side::Right)?,
            head: angle_between(left_shoulder, nose, right_shoulder),
        })
    }

    /// Horizontal head placement relative to the shoulders
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompleteLandmarks` if the nose or a shoulder is missing.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to [0, 100]
    pub fn head_horizontal(&self, landmarks: &LandmarkSet) -> Result<HeadHorizontalAlignment> {
        let nose = landmarks.point(LandmarkName::Nose)?;
        let left = landmarks.point(LandmarkName::LeftShoulder)?;
        let right = landmarks.point(LandmarkName::RightShoulder)?;

        let midpoint = (left.x + right.x) / 2.0;
        let half_width = (left.x - right.x).abs() / 2.0;
        let offset = nose.x - midpoint;

        if half_width < EPSILON {
            return Ok(HeadHorizontalAlignment {
                position: HeadHorizontal::Centered,
                percentage: 0,
            });
        }

        let ratio = offset.abs() / half_width;
        let position = if ratio <= HEAD_CENTERED_TOLERANCE {
            HeadHorizontal::Centered
        } else if offset < 0.0 {
            HeadHorizontal::ShiftedLeft
        } else {
            HeadHorizontal::ShiftedRight
        };
        let penalty = (ratio * f64::from(FULL_PERCENTAGE))
            .trunc()
            .min(f64::from(FULL_PERCENTAGE)) as u32;

        Ok(HeadHorizontalAlignment {
            position,
            percentage: FULL_PERCENTAGE - penalty,
        })
    }

    /// Score a frame.
    ///
    /// `None` means the detector found no body; that yields
    /// [`PostureReport::NoDetection`] and never an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompleteLandmarks` if a body was detected but a
    /// landmark required by the metrics is missing.
    pub fn evaluate_frame(&self, landmarks: Option<&LandmarkSet>) -> Result<PostureReport> {
        let Some(landmarks) = landmarks else {
            return Ok(PostureReport::NoDetection);
        };

        let head_position = self.classify_head_position(landmarks)?;
        let angles = self.compute_angles(landmarks)?;
        let shoulder = shoulder_alignment(&angles);
        let head_horizontal = self.head_horizontal(landmarks)?;

        Ok(PostureReport::Detected(PostureMetrics {
            head_position,
            shoulder,
            angles,
            overall_percentage: overall_percentage(shoulder.percentage),
            head_horizontal,
        }))
    }

    fn optional_point(
        &self,
        landmarks: &LandmarkSet,
        name: LandmarkName,
    ) -> Result<Option<Point>> {
        match self.config.missing_joints {
            MissingJointPolicy::Fail => landmarks.point(name).map(Some),
            MissingJointPolicy::Omit => Ok(landmarks.try_point(name)),
        }
    }

    fn knee_angle(&self, landmarks: &LandmarkSet, side: Side) -> Result<Option<u32>> {
        let (hip, knee, ankle) = match side {
            Side::Left => (LandmarkName::LeftHip, LandmarkName::LeftKnee, LandmarkName::LeftAnkle),
            Side::Right => (LandmarkName::RightHip, LandmarkName::RightKnee, LandmarkName::RightAnkle),
        };

        let hip = landmarks.point(hip)?;
        let Some(knee) = self.optional_point(landmarks, knee)? else {
            return Ok(None);
        };

        Ok(match self.config.knee_angle_mode {
            // Both rays end at the knee, so this is always 0
            KneeAngleMode::Legacy => Some(angle_between(hip, knee, knee)),
            KneeAngleMode::HipKneeAnkle => self
                .optional_point(landmarks, ankle)?
                .map(|ankle| angle_between(hip, knee, ankle)),
        })
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Shoulder alignment from the two shoulder angles.
///
/// Identical angles are 100% aligned; otherwise every degree of difference
/// costs one percent, never going below zero.
#[must_use]
pub fn shoulder_alignment(angles: &AngleMeasurements) -> ShoulderAlignment {
    let difference = angles.left_shoulder.abs_diff(angles.right_shoulder);
    let percentage = if difference == 0 {
        FULL_PERCENTAGE
    } else {
        FULL_PERCENTAGE.saturating_sub(difference)
    };
    ShoulderAlignment { percentage }
}

/// Overall posture score. Currently the shoulder alignment percentage alone.
#[must_use]
pub const fn overall_percentage(shoulder_percentage: u32) -> u32 {
    shoulder_percentage
}

/// [`PostureEngine::classify_head_position`] with default thresholds
///
/// # Errors
///
/// Returns `Error::IncompleteLandmarks` if the nose is not available.
pub fn classify_head_position(landmarks: &LandmarkSet) -> Result<HeadPosition> {
    PostureEngine::default().classify_head_position(landmarks)
}

/// [`PostureEngine::compute_angles`] with default settings
///
/// # Errors
///
/// Returns `Error::IncompleteLandmarks` if any required landmark is missing.
pub fn compute_angles(landmarks: &LandmarkSet) -> Result<AngleMeasurements> {
    PostureEngine::default().compute_angles(landmarks)
}

/// [`PostureEngine::evaluate_frame`] with default settings
///
/// # Errors
///
/// Returns `Error::IncompleteLandmarks` if a body was detected but a
/// required landmark is missing.
pub fn evaluate_frame(landmarks: Option<&LandmarkSet>) -> Result<PostureReport> {
    PostureEngine::default().evaluate_frame(landmarks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{landmarks::Landmark, Error};

    fn upright() -> LandmarkSet {
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
        ]
        .into_iter()
        .collect()
    }

    fn with_nose_y(y: f64) -> LandmarkSet {
        let mut set = upright();
        set.insert(LandmarkName::Nose, Landmark::new(0.5, y));
        set
    }

    #[test]
    fn test_head_position_boundaries() {
        assert_eq!(classify_head_position(&with_nose_y(0.29)).unwrap(), HeadPosition::Raised);
        assert_eq!(classify_head_position(&with_nose_y(0.30)).unwrap(), HeadPosition::Neutral);
        assert_eq!(classify_head_position(&with_nose_y(0.70)).unwrap(), HeadPosition::Neutral);
        assert_eq!(classify_head_position(&with_nose_y(0.71)).unwrap(), HeadPosition::Lowered);
    }

    #[test]
    fn test_angles_for_upright_pose() {
        let angles = compute_angles(&upright()).unwrap();
        assert_eq!(angles.left_shoulder, 86);
        assert_eq!(angles.right_shoulder, 86);
        assert_eq!(angles.left_elbow, Some(25));
        assert_eq!(angles.right_elbow, Some(25));
        assert_eq!(angles.head, 36);
        // Legacy knee geometry collapses to a zero-length ray
        assert_eq!(angles.left_knee, Some(0));
        assert_eq!(angles.right_knee, Some(0));
    }

    #[test]
    fn test_knee_angle_with_ankles() {
        let mut set = upright();
        set.insert(LandmarkName::LeftAnkle, Landmark::new(0.45, 1.2));
        set.insert(LandmarkName::RightAnkle, Landmark::new(0.55, 1.2));
        let engine = PostureEngine::new(MetricsConfig {
            knee_angle_mode: KneeAngleMode::HipKneeAnkle,
            ..MetricsConfig::default()
        });

        let angles = engine.compute_angles(&set).unwrap();
        assert_eq!(angles.left_knee, Some(171));
        assert_eq!(angles.right_knee, Some(171));
    }

    #[test]
    fn test_knee_angle_requires_ankle_when_strict() {
        let engine = PostureEngine::new(MetricsConfig {
            knee_angle_mode: KneeAngleMode::HipKneeAnkle,
            ..MetricsConfig::default()
        });
        match engine.compute_angles(&upright()) {
            Err(Error::IncompleteLandmarks { landmark }) => assert_eq!(landmark, LandmarkName::LeftAnkle),
            other => panic!("Expected IncompleteLandmarks, got {other:?}"),
        }
    }

    #[test]
    fn test_shoulder_alignment_percentages() {
        let mut angles = compute_angles(&upright()).unwrap();
        assert_eq!(shoulder_alignment(&angles).percentage, 100);
        assert!(shoulder_alignment(&angles).is_aligned());

        angles.left_shoulder = 90;
        angles.right_shoulder = 60;
        assert_eq!(shoulder_alignment(&angles).percentage, 70);
        assert_eq!(shoulder_alignment(&angles).message(), "Shoulders are 70% aligned");

        angles.left_shoulder = 170;
        angles.right_shoulder = 20;
        assert_eq!(shoulder_alignment(&angles).percentage, 0);
    }

    #[test]
    fn test_overall_is_shoulder_percentage() {
        for p in [0, 42, 100] {
            assert_eq!(overall_percentage(p), p);
        }
    }

    #[test]
    fn test_head_horizontal() {
        let engine = PostureEngine::default();
        let centered = engine.head_horizontal(&upright()).unwrap();
        assert_eq!(centered.position, HeadHorizontal::Centered);
        assert_eq!(centered.percentage, 100);

        let mut set = upright();
        set.insert(LandmarkName::Nose, Landmark::new(0.45, 0.2));
        let left = engine.head_horizontal(&set).unwrap();
        assert_eq!(left.position, HeadHorizontal::ShiftedLeft);
        assert!(left.percentage < 100);

        set.insert(LandmarkName::Nose, Landmark::new(0.9, 0.2));
        let far_right = engine.head_horizontal(&set).unwrap();
        assert_eq!(far_right.position, HeadHorizontal::ShiftedRight);
        assert_eq!(far_right.percentage, 0);
    }

    #[test]
    fn test_head_horizontal_stacked_shoulders() {
        let engine = PostureEngine::default();
        let mut set = upright();
        set.insert(LandmarkName::LeftShoulder, Landmark::new(0.5, 0.5));
        set.insert(LandmarkName::RightShoulder, Landmark::new(0.5, 0.5));

        for nose_x in [0.5, 0.5 + 1e-12, 0.5 - 1e-12, 0.8] {
            set.insert(LandmarkName::Nose, Landmark::new(nose_x, 0.2));
            let stacked = engine.head_horizontal(&set).unwrap();
            assert_eq!(stacked.position, HeadHorizontal::Centered, "nose.x = {nose_x}");
            assert_eq!(stacked.percentage, 0, "nose.x = {nose_x}");
        }
    }

    #[test]
    fn test_no_detection_is_not_an_error() {
        assert_eq!(evaluate_frame(None).unwrap(), PostureReport::NoDetection);
        assert!(evaluate_frame(None).unwrap().metrics().is_none());
    }

    #[test]
    fn test_evaluate_frame_populates_report() {
        let report = evaluate_frame(Some(&upright())).unwrap();
        let metrics = report.metrics().expect("body detected");
        assert_eq!(metrics.head_position, HeadPosition::Raised);
        assert_eq!(metrics.shoulder.percentage, 100);
        assert_eq!(metrics.overall_percentage, 100);
        assert_eq!(metrics.angles.iter().count(), Joint::ALL.len());
    }

    #[test]
    fn test_omit_policy_drops_only_peripheral_joints() {
        let set: LandmarkSet = upright()
            .iter()
            .filter(|(name, _)| !matches!(name, LandmarkName::LeftWrist | LandmarkName::RightKnee))
            .map(|(name, lm)| (name, *lm))
            .collect();

        assert!(evaluate_frame(Some(&set)).is_err());

        let engine = PostureEngine::new(MetricsConfig {
            missing_joints: MissingJointPolicy::Omit,
            ..MetricsConfig::default()
        });
        let angles = engine.compute_angles(&set).unwrap();
        assert_eq!(angles.left_elbow, None);
        assert_eq!(angles.right_knee, None);
        assert!(angles.right_elbow.is_some());
        assert!(angles.left_knee.is_some());
    }
}
