//! Calibration errors.

use facecursor_common::error::FacecursorError;
use thiserror::Error;

use crate::regression::FitError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalibrationError {
    /// Pixel buffer length does not match the declared dimensions.
    #[error("eye image buffer has {actual} pixels, expected {expected}")]
    ImageSize { expected: usize, actual: usize },

    /// Nothing left after trimming the border.
    #[error("eye image {width}x{height} has no interior after a {margin}px margin")]
    ImageTooSmall { width: u32, height: u32, margin: u32 },

    #[error("threshold search has no candidates")]
    NoCandidates,

    #[error(transparent)]
    Fit(#[from] FitError),
}

pub type CalibrationResult<T> = Result<T, CalibrationError>;

impl From<CalibrationError> for FacecursorError {
    fn from(err: CalibrationError) -> Self {
        FacecursorError::calibration(err.to_string())
    }
}

impl From<FitError> for FacecursorError {
    fn from(err: FitError) -> Self {
        FacecursorError::calibration(err.to_string())
    }
}
