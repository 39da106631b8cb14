//! Calibration session: collects samples and produces a parameter set.

use facecursor_common::config::CalibrationDefaults;
use facecursor_model::geometry::Point2D;
use serde::{Deserialize, Serialize};

use crate::error::CalibrationResult;
use crate::image::EyeImage;
use crate::regression::{
    fit_with_minimum, CalibrationSample, FitError, RegressionModel, MIN_SAMPLES,
};
use crate::threshold::{EyeSide, ThresholdCalibration};

/// Everything a calibration run produces. Runtime-only, never persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationParams {
    pub left_threshold: Option<u8>,
    pub right_threshold: Option<u8>,
    pub model: Option<RegressionModel>,
}

/// State of one calibration session.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    thresholds: ThresholdCalibration,
    samples: Vec<CalibrationSample>,
    min_samples: usize,
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self {
            thresholds: ThresholdCalibration::default(),
            samples: Vec::new(),
            min_samples: MIN_SAMPLES,
        }
    }
}

impl CalibrationSession {
    pub fn new(defaults: &CalibrationDefaults) -> Self {
        Self {
            thresholds: ThresholdCalibration::from_defaults(defaults),
            samples: Vec::new(),
            min_samples: defaults.min_regression_samples,
        }
    }

    /// Feed one eye image into the threshold search for `side`.
    pub fn evaluate_eye(&mut self, image: &EyeImage, side: EyeSide) -> CalibrationResult<u8> {
        self.thresholds.evaluate(image, side)
    }

    pub fn thresholds(&self) -> &ThresholdCalibration {
        &self.thresholds
    }

    /// Record where the eye was while the user looked at `screen_point`.
    pub fn add_sample(&mut self, eye_position: Point2D, screen_point: Point2D) {
        self.samples
            .push(CalibrationSample::new(eye_position, screen_point));
        tracing::debug!(
            count = self.samples.len(),
            eye_x = eye_position.x,
            eye_y = eye_position.y,
            "Calibration sample added"
        );
    }

    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether enough samples exist to attempt a fit.
    pub fn is_ready(&self) -> bool {
        self.samples.len() >= self.min_samples
    }

    /// Drop collected samples; threshold progress is kept.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Fit the regression over the samples collected so far.
    pub fn fit(&self) -> Result<RegressionModel, FitError> {
        fit_with_minimum(&self.samples, self.min_samples)
    }

    /// Snapshot the current thresholds and, when it can be fit, the model.
    pub fn finish(&self) -> CalibrationParams {
        let model = match self.fit() {
            Ok(model) => Some(model),
            Err(e) => {
                tracing::warn!(error = %e, "Calibration finished without a regression model");
                None
            }
        };
        CalibrationParams {
            left_threshold: self.thresholds.threshold(EyeSide::Left),
            right_threshold: self.thresholds.threshold(EyeSide::Right),
            model,
        }
    }
}
