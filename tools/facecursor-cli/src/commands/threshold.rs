//! Per-eye pupil threshold calibration over image files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use facecursor_calibration::{EyeImage, EyeSide, ThresholdCalibration};
use facecursor_common::config::AppConfig;

pub fn run(config: &AppConfig, side: EyeSide, images: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut calibration = ThresholdCalibration::from_defaults(&config.calibration);

    println!("Calibrating {side:?} eye over {} image(s)", images.len());
    for path in &images {
        let image = load_eye_image(path)?;
        let threshold = calibration
            .evaluate(&image, side)
            .with_context(|| format!("Threshold search failed for {}", path.display()))?;
        println!("  {}: {threshold}", path.display());
    }
    println!();

    let seen = calibration.samples(side).len();
    let required = calibration.frames_required();
    match calibration.threshold(side) {
        Some(threshold) if seen >= required => {
            println!("Threshold: {threshold} (mean of {seen} frames)");
        }
        Some(threshold) => {
            println!("Provisional threshold: {threshold} ({seen} of {required} frames)");
        }
        None => println!("No frames evaluated"),
    }
    Ok(())
}

fn load_eye_image(path: &Path) -> anyhow::Result<EyeImage> {
    let luma = image::open(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_luma8();
    let (width, height) = luma.dimensions();
    EyeImage::new(width, height, luma.into_raw())
        .with_context(|| format!("Unexpected pixel buffer for {}", path.display()))
}
