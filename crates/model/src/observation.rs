//! Per-frame detector observations.
//!
//! The face/eye detector is external; its output for one frame is captured
//! as a [`FrameObservation`]. Streams of observations are stored as JSONL,
//! one object per line, with `#`-prefixed comment/header lines allowed.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;

/// Monotonic timestamp in nanoseconds since session start.
pub type TimestampNs = u64;

/// Ordered facial landmarks for one frame, in normalized image coordinates.
///
/// Serialized as a list of `[x, y]` pairs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct LandmarkSet {
    points: Vec<Point2D>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Point2D> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }
}

impl From<Vec<[f64; 2]>> for LandmarkSet {
    fn from(raw: Vec<[f64; 2]>) -> Self {
        Self {
            points: raw.into_iter().map(|[x, y]| Point2D::new(x, y)).collect(),
        }
    }
}

impl From<LandmarkSet> for Vec<[f64; 2]> {
    fn from(set: LandmarkSet) -> Self {
        set.points.into_iter().map(|p| [p.x, p.y]).collect()
    }
}

impl FromIterator<Point2D> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = Point2D>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Discrete gaze classification produced by some detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeDirection {
    Left,
    Right,
    Up,
    Down,
    Center,
}

impl GazeDirection {
    /// Unit step `(dx, dy)` in screen space (y grows downward).
    pub fn unit_step(&self) -> (f64, f64) {
        match self {
            GazeDirection::Left => (-1.0, 0.0),
            GazeDirection::Right => (1.0, 0.0),
            GazeDirection::Up => (0.0, -1.0),
            GazeDirection::Down => (0.0, 1.0),
            GazeDirection::Center => (0.0, 0.0),
        }
    }
}

/// Everything the detector reported for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameObservation {
    /// Monotonic nanoseconds since session start.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Frame dimensions in pixels, used to denormalize landmarks.
    pub frame_width: u32,
    pub frame_height: u32,

    /// Landmarks of the (single) detected face; absent when detection failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<LandmarkSet>,

    /// Whether the detector considers the eyes closed in this frame.
    #[serde(default)]
    pub blinking: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaze: Option<GazeDirection>,

    /// Raw gaze estimate in screen pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaze_point: Option<Point2D>,

    /// Pupil position, the input of a calibrated regression model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_position: Option<Point2D>,
}

impl FrameObservation {
    /// An observation with no face and open eyes.
    pub fn empty(timestamp_ns: TimestampNs, frame_width: u32, frame_height: u32) -> Self {
        Self {
            timestamp_ns,
            frame_width,
            frame_height,
            landmarks: None,
            blinking: false,
            gaze: None,
            gaze_point: None,
            eye_position: None,
        }
    }

    pub fn with_landmarks(mut self, landmarks: LandmarkSet) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    pub fn with_blinking(mut self, blinking: bool) -> Self {
        self.blinking = blinking;
        self
    }

    pub fn with_gaze(mut self, gaze: GazeDirection) -> Self {
        self.gaze = Some(gaze);
        self
    }

    pub fn with_gaze_point(mut self, point: Point2D) -> Self {
        self.gaze_point = Some(point);
        self
    }

    pub fn with_eye_position(mut self, point: Point2D) -> Self {
        self.eye_position = Some(point);
        self
    }

    /// Timestamp as fractional seconds since session start.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }
}

/// Parse observations from JSONL content (one JSON object per line).
pub fn parse_observations(jsonl: &str) -> Result<Vec<FrameObservation>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize observations to JSONL format.
pub fn serialize_observations(
    observations: &[FrameObservation],
) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for observation in observations {
        output.push_str(&serde_json::to_string(observation)?);
        output.push('\n');
    }
    Ok(output)
}
