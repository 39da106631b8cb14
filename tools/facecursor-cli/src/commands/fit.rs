//! Fit the eye-to-screen regression from a sample file.

use std::path::PathBuf;

use anyhow::Context;
use facecursor_calibration::regression::fit_with_minimum;
use facecursor_calibration::{CalibrationSample, FitError};
use facecursor_common::config::AppConfig;

pub fn run(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let samples: Vec<CalibrationSample> =
        serde_json::from_str(&content).context("Samples must be a JSON array")?;

    println!("Samples: {}", samples.len());

    match fit_with_minimum(&samples, config.calibration.min_regression_samples) {
        Ok(model) => {
            let [a, b, c] = model.x_coefficients;
            println!("screen_x = {a:.6} * eye_x^2 + {b:.6} * eye_x + {c:.6}");
            let [a, b, c] = model.y_coefficients;
            println!("screen_y = {a:.6} * eye_y^2 + {b:.6} * eye_y + {c:.6}");
            println!();
            println!("{}", serde_json::to_string_pretty(&model)?);
            Ok(())
        }
        Err(e @ FitError::NotReady { .. }) => {
            println!("Not ready: {e}");
            Ok(())
        }
        Err(e) => Err(e).context("Calibration samples cannot be fit"),
    }
}
