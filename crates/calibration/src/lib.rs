//! facecursor calibration
//!
//! Two independent calibration procedures, both run outside the per-frame
//! loop and both producing plain parameter objects:
//! - **Threshold search:** per-eye binarization threshold whose dark-pixel
//!   ratio best matches the expected iris proportion
//! - **Mapping regression:** quadratic least-squares fit from eye position
//!   to screen position, one polynomial per axis
//!
//! [`ActiveCalibration`] publishes a finished parameter set to a running
//! tracking loop without tearing.

pub mod active;
pub mod error;
pub mod image;
pub mod regression;
pub mod session;
pub mod threshold;

pub use active::ActiveCalibration;
pub use error::{CalibrationError, CalibrationResult};
pub use image::EyeImage;
pub use regression::{fit, Axis, CalibrationSample, FitError, RegressionModel};
pub use session::{CalibrationParams, CalibrationSession};
pub use threshold::{find_best_threshold, EyeSide, ThresholdCalibration, ThresholdSearch, ThresholdTrial};
