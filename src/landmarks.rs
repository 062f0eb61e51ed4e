//! Named body landmarks and per-frame landmark sets.
//!
//! The detector boundary converts whatever its model emits into a
//! [`LandmarkSet`] keyed by [`LandmarkName`], so nothing downstream depends on
//! a particular detector's output layout.

use crate::{constants::NUM_POSE_LANDMARKS, geometry::Point, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Body landmark vocabulary, in BlazePose output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandmarkName {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl LandmarkName {
    /// All landmarks, indexed by their model output position
    pub const ALL: [Self; NUM_POSE_LANDMARKS] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Position of this landmark in the model output
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Landmark at the given model output position
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Canonical upper-case name, e.g. `LEFT_SHOULDER`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "NOSE",
            Self::LeftEyeInner => "LEFT_EYE_INNER",
            Self::LeftEye => "LEFT_EYE",
            Self::LeftEyeOuter => "LEFT_EYE_OUTER",
            Self::RightEyeInner => "RIGHT_EYE_INNER",
            Self::RightEye => "RIGHT_EYE",
            Self::RightEyeOuter => "RIGHT_EYE_OUTER",
            Self::LeftEar => "LEFT_EAR",
            Self::RightEar => "RIGHT_EAR",
            Self::MouthLeft => "MOUTH_LEFT",
            Self::MouthRight => "MOUTH_RIGHT",
            Self::LeftShoulder => "LEFT_SHOULDER",
            Self::RightShoulder => "RIGHT_SHOULDER",
            Self::LeftElbow => "LEFT_ELBOW",
            Self::RightElbow => "RIGHT_ELBOW",
            Self::LeftWrist => "LEFT_WRIST",
            Self::RightWrist => "RIGHT_WRIST",
            Self::LeftPinky => "LEFT_PINKY",
            Self::RightPinky => "RIGHT_PINKY",
            Self::LeftIndex => "LEFT_INDEX",
            Self::RightIndex => "RIGHT_INDEX",
            Self::LeftThumb => "LEFT_THUMB",
            Self::RightThumb => "RIGHT_THUMB",
            Self::LeftHip => "LEFT_HIP",
            Self::RightHip => "RIGHT_HIP",
            Self::LeftKnee => "LEFT_KNEE",
            Self::RightKnee => "RIGHT_KNEE",
            Self::LeftAnkle => "LEFT_ANKLE",
            Self::RightAnkle => "RIGHT_ANKLE",
            Self::LeftHeel => "LEFT_HEEL",
            Self::RightHeel => "RIGHT_HEEL",
            Self::LeftFootIndex => "LEFT_FOOT_INDEX",
            Self::RightFootIndex => "RIGHT_FOOT_INDEX",
        }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected keypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized horizontal coordinate
    pub x: f64,
    /// Normalized vertical coordinate (0 = top of frame)
    pub y: f64,
    /// Detector confidence that the keypoint is visible, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    /// Landmark without a visibility score
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, visibility: None }
    }

    /// Landmark with a visibility score
    #[must_use]
    pub const fn with_visibility(x: f64, y: f64, visibility: f32) -> Self {
        Self {
            x,
            y,
            visibility: Some(visibility),
        }
    }

    /// Coordinates of the landmark
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Landmarks without a score are always considered visible
    #[must_use]
    pub fn is_visible(&self, min_visibility: f32) -> bool {
        self.visibility.map_or(true, |v| v >= min_visibility)
    }
}

/// All landmarks detected for one body in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    landmarks: BTreeMap<LandmarkName, Landmark>,
    min_visibility: f32,
}

impl LandmarkSet {
    /// Empty set that accepts landmarks of any visibility
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat landmarks scored below `min_visibility` as missing
    #[must_use]
    pub fn with_min_visibility(mut self, min_visibility: f32) -> Self {
        self.min_visibility = min_visibility;
        self
    }

    /// Visibility threshold applied by the accessors
    #[must_use]
    pub fn min_visibility(&self) -> f32 {
        self.min_visibility
    }

    /// Add or replace a landmark
    pub fn insert(&mut self, name: LandmarkName, landmark: Landmark) {
        self.landmarks.insert(name, landmark);
    }

    /// Raw landmark as detected, ignoring the visibility threshold
    #[must_use]
    pub fn get(&self, name: LandmarkName) -> Option<&Landmark> {
        self.landmarks.get(&name)
    }

    /// Coordinates of a landmark, or `None` if it is missing or not visible
    #[must_use]
    pub fn try_point(&self, name: LandmarkName) -> Option<Point> {
        self.landmarks
            .get(&name)
            .filter(|lm| lm.is_visible(self.min_visibility))
            .map(Landmark::point)
    }

    /// Coordinates of a landmark the caller cannot do without
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteLandmarks`] if the landmark is missing or
    /// below the visibility threshold. No default coordinate is substituted.
    pub fn point(&self, name: LandmarkName) -> Result<Point> {
        self.try_point(name)
            .ok_or(Error::IncompleteLandmarks { landmark: name })
    }

    /// Number of landmarks in the set, visible or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    /// Whether the set holds no landmarks at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Iterate over landmarks in model output order
    pub fn iter(&self) -> impl Iterator<Item = (LandmarkName, &Landmark)> {
        self.landmarks.iter().map(|(name, lm)| (*name, lm))
    }
}

impl FromIterator<(LandmarkName, Landmark)> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = (LandmarkName, Landmark)>>(iter: I) -> Self {
        Self {
            landmarks: iter.into_iter().collect(),
            min_visibility: 0.0,
        }
    }
}

impl From<BTreeMap<LandmarkName, Landmark>> for LandmarkSet {
    fn from(landmarks: BTreeMap<LandmarkName, Landmark>) -> Self {
        Self {
            landmarks,
            min_visibility: 0.0,
        }
    }
}
