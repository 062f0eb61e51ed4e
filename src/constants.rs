//! Constants used throughout the application

/// Number of body landmarks produced by the BlazePose topology
pub const NUM_POSE_LANDMARKS: usize = 33;

/// Values per landmark in the landmark model output (x, y, z, visibility, presence)
pub const LANDMARK_MODEL_STRIDE: usize = 5;

/// Default landmark model input size (square)
pub const DEFAULT_POSE_INPUT_SIZE: i32 = 256;

/// Default minimum pose presence score for a body to count as detected
pub const DEFAULT_MIN_DETECTION_CONFIDENCE: f32 = 0.7;

/// Nose heights above this line (normalized, 0 = top) classify as raised
pub const DEFAULT_HEAD_RAISED_THRESHOLD: f64 = 0.3;

/// Nose heights below this line classify as lowered
pub const DEFAULT_HEAD_LOWERED_THRESHOLD: f64 = 0.7;

/// Largest angle `angle_between` can return, in degrees
pub const MAX_ANGLE_DEGREES: u32 = 180;

/// Upper bound of every percentage field
pub const FULL_PERCENTAGE: u32 = 100;

/// Nose offset (as a fraction of half the shoulder width) still counted as centered
pub const HEAD_CENTERED_TOLERANCE: f64 = 0.25;

/// Default JPEG quality for the re-encoded frame
pub const DEFAULT_JPEG_QUALITY: i32 = 90;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
