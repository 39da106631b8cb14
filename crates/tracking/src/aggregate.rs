//! Landmark aggregation.
//!
//! Collapses a face's landmark set into one representative head position:
//! the arithmetic mean of a subset of landmarks, scaled from normalized
//! coordinates to frame pixels.

use facecursor_common::config::LandmarkSubsetSetting;
use facecursor_model::geometry::Point2D;
use facecursor_model::observation::LandmarkSet;

/// Nose tip, outer eye corners, and mouth corners of a 468-point face mesh.
pub const HEAD_ANCHOR_INDICES: [usize; 5] = [1, 33, 263, 61, 291];

/// Which landmarks feed the aggregate position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LandmarkSubset {
    /// Every landmark in the set.
    #[default]
    All,
    /// [`HEAD_ANCHOR_INDICES`]: stable, rigid points.
    HeadAnchors,
    Custom(Vec<usize>),
}

impl LandmarkSubset {
    pub fn from_setting(setting: &LandmarkSubsetSetting) -> Self {
        match setting {
            LandmarkSubsetSetting::All => LandmarkSubset::All,
            LandmarkSubsetSetting::HeadAnchors => LandmarkSubset::HeadAnchors,
            LandmarkSubsetSetting::Custom(indices) => LandmarkSubset::Custom(indices.clone()),
        }
    }

    /// Aggregate position of this subset, or `None` when the landmarks
    /// cannot supply it (empty set, or an index out of range).
    pub fn position(
        &self,
        landmarks: &LandmarkSet,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<Point2D> {
        match self {
            LandmarkSubset::All => {
                if landmarks.is_empty() {
                    return None;
                }
                let indices: Vec<usize> = (0..landmarks.len()).collect();
                aggregate(landmarks, &indices, frame_width, frame_height)
            }
            LandmarkSubset::HeadAnchors => {
                aggregate(landmarks, &HEAD_ANCHOR_INDICES, frame_width, frame_height)
            }
            LandmarkSubset::Custom(indices) if indices.is_empty() => None,
            LandmarkSubset::Custom(indices) => {
                aggregate(landmarks, indices, frame_width, frame_height)
            }
        }
    }
}

/// Mean of the selected landmarks, in frame pixels.
///
/// Returns `None` if any index is out of range for `landmarks`.
///
/// # Panics
///
/// Panics if `indices` is empty; callers always select at least one point.
pub fn aggregate(
    landmarks: &LandmarkSet,
    indices: &[usize],
    frame_width: u32,
    frame_height: u32,
) -> Option<Point2D> {
    assert!(!indices.is_empty(), "landmark index set must not be empty");

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for &index in indices {
        let point = landmarks.get(index)?;
        sum_x += point.x * frame_width as f64;
        sum_y += point.y * frame_height as f64;
    }
    let n = indices.len() as f64;
    Some(Point2D::new(sum_x / n, sum_y / n))
}
