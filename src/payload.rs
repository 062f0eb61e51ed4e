//! JSON shapes exchanged with the viewer and with landmark recordings.

use crate::{
    landmarks::{Landmark, LandmarkName, LandmarkSet},
    posture::{Joint, PostureReport},
    Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sent in place of the head message when no body was detected
pub const NO_NOSE_MESSAGE: &str = "No landmarks detected for nose";
/// Sent in place of the shoulder message when no body was detected
pub const NO_SHOULDERS_MESSAGE: &str = "No landmarks detected for shoulders";
/// Sent in place of the horizontal head message when no body was detected
pub const NO_HEAD_POSITION_MESSAGE: &str = "No landmarks detected for head position";

/// Per-frame message returned to the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePayload {
    /// Annotated frame as base64 JPEG; empty when no frame was involved
    #[serde(default)]
    pub image: String,
    pub nose_message: String,
    pub shoulder_message: String,
    /// Joint angles in degrees; empty when no body was detected
    pub angles: BTreeMap<Joint, u32>,
    pub overall_percentage: Option<u32>,
    pub head_horizontal_message: String,
    pub head_horizontal_percentage: Option<u32>,
}

impl FramePayload {
    /// Package a report together with its encoded frame
    #[must_use]
    pub fn from_report(report: &PostureReport, image: String) -> Self {
        match report.metrics() {
            None => Self {
                image,
                nose_message: NO_NOSE_MESSAGE.to_string(),
                shoulder_message: NO_SHOULDERS_MESSAGE.to_string(),
                angles: BTreeMap::new(),
                overall_percentage: None,
                head_horizontal_message: NO_HEAD_POSITION_MESSAGE.to_string(),
                head_horizontal_percentage: None,
            },
            Some(metrics) => Self {
                image,
                nose_message: metrics.head_position.message().to_string(),
                shoulder_message: metrics.shoulder.message(),
                angles: metrics.angles.iter().collect(),
                overall_percentage: Some(metrics.overall_percentage),
                head_horizontal_message: metrics.head_horizontal.position.message().to_string(),
                head_horizontal_percentage: Some(metrics.head_horizontal.percentage),
            },
        }
    }

    /// Serialize to a single line of JSON
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Payload for one frame of a recording, tagged with its position in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedPayload {
    /// Zero-based index of the frame in the recording
    pub frame: usize,
    #[serde(flatten)]
    pub payload: FramePayload,
}

impl RecordedPayload {
    /// Serialize to a single line of JSON
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One recorded frame: `null` when the detector found no body
pub type RecordedFrame = Option<BTreeMap<LandmarkName, Landmark>>;

/// Parse a recording, a JSON array of frames keyed by landmark name.
///
/// ```json
/// [{"NOSE": {"x": 0.5, "y": 0.2, "visibility": 0.99}, "LEFT_SHOULDER": {"x": 0.4, "y": 0.5}}, null]
/// ```
///
/// # Errors
///
/// Returns [`crate::Error::Serialization`] if the JSON does not match.
pub fn parse_recording(json: &str, min_visibility: f32) -> Result<Vec<Option<LandmarkSet>>> {
    let frames: Vec<RecordedFrame> = serde_json::from_str(json)?;
    Ok(frames
        .into_iter()
        .map(|frame| frame.map(|map| LandmarkSet::from(map).with_min_visibility(min_visibility)))
        .collect())
}
