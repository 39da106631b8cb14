//! Pupil binarization threshold search.
//!
//! For one eye image, every candidate threshold is tried and the one whose
//! dark-pixel ratio is closest to the expected iris proportion wins.
//! [`ThresholdCalibration`] repeats the search over many frames per eye and
//! averages the winners.

use facecursor_common::config::CalibrationDefaults;
use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationResult};
use crate::image::EyeImage;

/// Expected share of the eye surface covered by the iris.
pub const DEFAULT_TARGET_RATIO: f64 = 0.48;

/// Border excluded from the ratio to avoid edge artifacts.
pub const DEFAULT_MARGIN: u32 = 5;

pub const DEFAULT_ERODE_ITERATIONS: u32 = 3;

pub const DEFAULT_FRAMES_PER_EYE: usize = 20;

/// Outcome of binarizing an eye image at one threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTrial {
    pub threshold: u8,
    pub iris_ratio: f64,
}

/// Which eye an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeSide {
    Left,
    Right,
}

/// Parameters of the threshold search.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSearch {
    pub target_ratio: f64,
    pub margin: u32,
    pub erode_iterations: u32,
    /// Candidate thresholds, tried in order. Ties go to the earliest.
    pub candidates: Vec<u8>,
}

impl Default for ThresholdSearch {
    fn default() -> Self {
        Self {
            target_ratio: DEFAULT_TARGET_RATIO,
            margin: DEFAULT_MARGIN,
            erode_iterations: DEFAULT_ERODE_ITERATIONS,
            candidates: (5..100).step_by(5).collect(),
        }
    }
}

impl ThresholdSearch {
    pub fn from_defaults(defaults: &CalibrationDefaults) -> Self {
        Self {
            target_ratio: defaults.target_iris_ratio,
            margin: defaults.margin_px,
            erode_iterations: defaults.erode_iterations,
            ..Self::default()
        }
    }

    /// Binarize at every candidate and measure the iris ratio.
    pub fn trials(&self, image: &EyeImage) -> CalibrationResult<Vec<ThresholdTrial>> {
        let eroded = image.eroded(self.erode_iterations);
        self.candidates
            .iter()
            .map(|&threshold| {
                let iris_ratio = eroded.threshold(threshold).dark_ratio(self.margin)?;
                Ok(ThresholdTrial {
                    threshold,
                    iris_ratio,
                })
            })
            .collect()
    }

    /// Threshold whose iris ratio is closest to the target.
    pub fn find_best_threshold(&self, image: &EyeImage) -> CalibrationResult<u8> {
        let mut best: Option<(u8, f64)> = None;
        for trial in self.trials(image)? {
            let distance = (trial.iris_ratio - self.target_ratio).abs();
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((trial.threshold, distance)),
            }
        }
        best.map(|(threshold, _)| threshold)
            .ok_or(CalibrationError::NoCandidates)
    }
}

/// Best threshold for one eye image using the default search.
pub fn find_best_threshold(image: &EyeImage) -> CalibrationResult<u8> {
    ThresholdSearch::default().find_best_threshold(image)
}

/// Accumulates per-eye best thresholds over calibration frames.
#[derive(Debug, Clone)]
pub struct ThresholdCalibration {
    search: ThresholdSearch,
    frames_required: usize,
    left: Vec<u8>,
    right: Vec<u8>,
}

impl Default for ThresholdCalibration {
    fn default() -> Self {
        Self::new(DEFAULT_FRAMES_PER_EYE)
    }
}

impl ThresholdCalibration {
    pub fn new(frames_required: usize) -> Self {
        Self::with_search(frames_required, ThresholdSearch::default())
    }

    pub fn with_search(frames_required: usize, search: ThresholdSearch) -> Self {
        Self {
            search,
            frames_required,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    pub fn from_defaults(defaults: &CalibrationDefaults) -> Self {
        Self::with_search(
            defaults.threshold_frames,
            ThresholdSearch::from_defaults(defaults),
        )
    }

    /// Run the search on one eye image and record the winner for `side`.
    pub fn evaluate(&mut self, image: &EyeImage, side: EyeSide) -> CalibrationResult<u8> {
        let threshold = self.search.find_best_threshold(image)?;
        self.record(side, threshold);
        Ok(threshold)
    }

    /// Record an already-computed threshold for `side`.
    pub fn record(&mut self, side: EyeSide, threshold: u8) {
        let was_complete = self.is_complete();
        match side {
            EyeSide::Left => self.left.push(threshold),
            EyeSide::Right => self.right.push(threshold),
        }
        if !was_complete && self.is_complete() {
            tracing::info!(
                left = ?self.threshold(EyeSide::Left),
                right = ?self.threshold(EyeSide::Right),
                frames = self.frames_required,
                "Threshold calibration complete"
            );
        }
    }

    /// Whether both eyes have at least `frames_required` samples.
    pub fn is_complete(&self) -> bool {
        self.left.len() >= self.frames_required && self.right.len() >= self.frames_required
    }

    /// Truncated mean of the thresholds recorded for `side`.
    pub fn threshold(&self, side: EyeSide) -> Option<u8> {
        let samples = self.samples(side);
        if samples.is_empty() {
            return None;
        }
        let sum: u64 = samples.iter().map(|&t| t as u64).sum();
        Some((sum / samples.len() as u64) as u8)
    }

    pub fn samples(&self, side: EyeSide) -> &[u8] {
        match side {
            EyeSide::Left => &self.left,
            EyeSide::Right => &self.right,
        }
    }

    pub fn frames_required(&self) -> usize {
        self.frames_required
    }

    pub fn search(&self) -> &ThresholdSearch {
        &self.search
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 30x30 image whose interior (20x20 after the margin) is split into
    /// horizontal bands of known brightness.
    fn banded_image(bands: &[(u32, u8)]) -> EyeImage {
        EyeImage::from_fn(30, 30, |_, y| {
            let row = y.saturating_sub(DEFAULT_MARGIN);
            let mut start = 0;
            for &(rows, value) in bands {
                if row < start + rows {
                    return value;
                }
                start += rows;
            }
            255
        })
    }

    fn plain_search() -> ThresholdSearch {
        ThresholdSearch {
            erode_iterations: 0,
            ..ThresholdSearch::default()
        }
    }

    #[test]
    fn test_default_candidates() {
        let search = ThresholdSearch::default();
        assert_eq!(search.candidates.first(), Some(&5));
        assert_eq!(search.candidates.last(), Some(&95));
        assert_eq!(search.candidates.len(), 19);
    }

    #[test]
    fn test_picks_threshold_closest_to_target() {
        // 8 rows at 20, 2 rows at 40, rest bright: ratio 0.4 for t in [20, 40),
        // 0.5 for t in [40, 255).
        let image = banded_image(&[(8, 20), (2, 40), (10, 250)]);
        let search = plain_search();
        let trials = search.trials(&image).unwrap();
        let at = |t: u8| trials.iter().find(|tr| tr.threshold == t).unwrap().iris_ratio;
        assert_eq!(at(15), 0.0);
        assert_eq!(at(20), 0.4);
        assert_eq!(at(40), 0.5);
        assert_eq!(search.find_best_threshold(&image).unwrap(), 40);
    }

    #[test]
    fn test_ties_resolve_to_smaller_threshold() {
        // Target 0.5; ratio 0.25 for t in [30, 60) and 0.75 from 60 on, so
        // both plateaus sit exactly 0.25 away.
        let image = banded_image(&[(5, 30), (10, 60), (5, 250)]);
        let search = ThresholdSearch {
            target_ratio: 0.5,
            ..plain_search()
        };
        let trials = search.trials(&image).unwrap();
        let at = |t: u8| trials.iter().find(|tr| tr.threshold == t).unwrap().iris_ratio;
        assert_eq!(at(30), 0.25);
        assert_eq!(at(60), 0.75);
        assert_eq!(search.find_best_threshold(&image).unwrap(), 30);
    }

    #[test]
    fn test_flat_landscape_returns_first_candidate() {
        let image = EyeImage::from_fn(30, 30, |_, _| 255);
        assert_eq!(plain_search().find_best_threshold(&image).unwrap(), 5);
    }

    #[test]
    fn test_empty_candidates_is_an_error() {
        let search = ThresholdSearch {
            candidates: vec![],
            ..plain_search()
        };
        let image = EyeImage::from_fn(30, 30, |_, _| 0);
        assert_eq!(
            search.find_best_threshold(&image),
            Err(CalibrationError::NoCandidates)
        );
    }

    #[test]
    fn test_completion_requires_both_sides() {
        let mut calibration = ThresholdCalibration::new(3);
        for t in [10, 20, 30] {
            calibration.record(EyeSide::Left, t);
        }
        assert!(!calibration.is_complete());
        calibration.record(EyeSide::Right, 50);
        calibration.record(EyeSide::Right, 55);
        assert!(!calibration.is_complete());
        calibration.record(EyeSide::Right, 56);
        assert!(calibration.is_complete());

        assert_eq!(calibration.threshold(EyeSide::Left), Some(20));
        // (50 + 55 + 56) / 3 = 53.67, truncated.
        assert_eq!(calibration.threshold(EyeSide::Right), Some(53));
    }

    #[test]
    fn test_threshold_of_empty_side_is_none() {
        let calibration = ThresholdCalibration::default();
        assert_eq!(calibration.threshold(EyeSide::Left), None);
        assert_eq!(calibration.frames_required(), 20);
    }

    #[test]
    fn test_evaluate_records_search_result() {
        let mut calibration = ThresholdCalibration::with_search(1, plain_search());
        let image = banded_image(&[(8, 20), (2, 40), (10, 250)]);
        assert_eq!(calibration.evaluate(&image, EyeSide::Left).unwrap(), 40);
        assert_eq!(calibration.samples(EyeSide::Left), &[40]);
        assert!(calibration.samples(EyeSide::Right).is_empty());
    }
}
