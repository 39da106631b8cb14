//! Eye-position to screen-position regression.
//!
//! Each screen axis is fit independently with a degree-2 least-squares
//! polynomial of the matching eye axis: `screen_x ≈ f(eye_x)`,
//! `screen_y ≈ g(eye_y)`.
//!
//! # Numerics
//!
//! The abscissae are centered and scaled to `[-1, 1]` before the Vandermonde
//! system is solved via SVD, then the coefficients are mapped back. A design
//! matrix whose singular values collapse (fewer than three distinct eye
//! positions on an axis) is reported as [`FitError::Degenerate`] instead of
//! returning a minimum-norm solution that looks valid.

use facecursor_model::geometry::Point2D;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of samples before a fit is attempted.
pub const MIN_SAMPLES: usize = 4;

/// Singular-value ratio below which the system is treated as rank deficient.
const RANK_TOLERANCE: f64 = 1e-10;

/// One calibration observation: where the eye was while the user looked
/// at a known screen point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub eye_position: Point2D,
    pub screen_point: Point2D,
}

impl CalibrationSample {
    pub fn new(eye_position: Point2D, screen_point: Point2D) -> Self {
        Self {
            eye_position,
            screen_point,
        }
    }
}

/// Screen axis a fit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    /// Not enough samples yet; keep collecting.
    #[error("insufficient data: need at least {need} calibration samples, have {have}")]
    NotReady { have: usize, need: usize },

    /// Samples do not determine a quadratic on this axis.
    #[error("degenerate calibration samples on the {axis} axis")]
    Degenerate { axis: Axis },
}

/// Quadratic mapping per axis, coefficients highest power first:
/// `c[0] * v^2 + c[1] * v + c[2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    pub x_coefficients: [f64; 3],
    pub y_coefficients: [f64; 3],
}

impl RegressionModel {
    /// Predicted screen position for a live eye position.
    pub fn predict(&self, eye_position: Point2D) -> Point2D {
        Point2D::new(
            evaluate_quadratic(&self.x_coefficients, eye_position.x),
            evaluate_quadratic(&self.y_coefficients, eye_position.y),
        )
    }
}

/// Horner evaluation of a highest-power-first quadratic.
pub fn evaluate_quadratic(coefficients: &[f64; 3], v: f64) -> f64 {
    (coefficients[0] * v + coefficients[1]) * v + coefficients[2]
}

/// Fit a regression model, requiring at least [`MIN_SAMPLES`] samples.
pub fn fit(samples: &[CalibrationSample]) -> Result<RegressionModel, FitError> {
    fit_with_minimum(samples, MIN_SAMPLES)
}

/// Fit a regression model with a custom sample floor (never below 3, the
/// number of coefficients per axis).
pub fn fit_with_minimum(
    samples: &[CalibrationSample],
    min_samples: usize,
) -> Result<RegressionModel, FitError> {
    let need = min_samples.max(3);
    if samples.len() < need {
        return Err(FitError::NotReady {
            have: samples.len(),
            need,
        });
    }

    let eye_x: Vec<f64> = samples.iter().map(|s| s.eye_position.x).collect();
    let eye_y: Vec<f64> = samples.iter().map(|s| s.eye_position.y).collect();
    let screen_x: Vec<f64> = samples.iter().map(|s| s.screen_point.x).collect();
    let screen_y: Vec<f64> = samples.iter().map(|s| s.screen_point.y).collect();

    let x_coefficients =
        fit_quadratic(&eye_x, &screen_x).ok_or(FitError::Degenerate { axis: Axis::X })?;
    let y_coefficients =
        fit_quadratic(&eye_y, &screen_y).ok_or(FitError::Degenerate { axis: Axis::Y })?;

    tracing::debug!(
        samples = samples.len(),
        ?x_coefficients,
        ?y_coefficients,
        "Fitted eye-to-screen regression"
    );

    Ok(RegressionModel {
        x_coefficients,
        y_coefficients,
    })
}

/// Least-squares quadratic through `(xs[i], ys[i])`, highest power first.
///
/// Returns `None` when the points do not determine a unique quadratic or the
/// solution is not finite.
pub fn fit_quadratic(xs: &[f64], ys: &[f64]) -> Option<[f64; 3]> {
    if xs.len() != ys.len() || xs.len() < 3 {
        return None;
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return None;
    }

    let n = xs.len();
    let mean = xs.iter().sum::<f64>() / n as f64;
    let scale = xs.iter().map(|x| (x - mean).abs()).fold(0.0, f64::max);
    if scale == 0.0 {
        return None;
    }

    let design = DMatrix::from_fn(n, 3, |row, col| {
        let u = (xs[row] - mean) / scale;
        match col {
            0 => u * u,
            1 => u,
            _ => 1.0,
        }
    });
    let rhs = DVector::from_column_slice(ys);

    let svd = design.svd(true, true);
    let largest = svd.singular_values.max();
    let smallest = svd.singular_values.min();
    if largest <= 0.0 || smallest / largest < RANK_TOLERANCE {
        return None;
    }
    let solution = svd.solve(&rhs, RANK_TOLERANCE * largest).ok()?;

    // Undo the normalization u = (x - mean) / scale.
    let (a, b, c) = (solution[0], solution[1], solution[2]);
    let s2 = scale * scale;
    let coefficients = [
        a / s2,
        b / scale - 2.0 * a * mean / s2,
        a * mean * mean / s2 - b * mean / scale + c,
    ];

    coefficients
        .iter()
        .all(|c| c.is_finite())
        .then_some(coefficients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(ex: f64, ey: f64, sx: f64, sy: f64) -> CalibrationSample {
        CalibrationSample::new(Point2D::new(ex, ey), Point2D::new(sx, sy))
    }

    #[test]
    fn test_linear_samples_recover_slope() {
        let samples: Vec<_> = (0..4)
            .map(|i| {
                let v = i as f64;
                sample(v, v, v * 100.0, v * 50.0 + 10.0)
            })
            .collect();
        let model = fit(&samples).unwrap();
        assert!(model.x_coefficients[0].abs() < 1e-6);
        assert!((model.x_coefficients[1] - 100.0).abs() < 1e-6);
        assert!(model.x_coefficients[2].abs() < 1e-6);
        assert!((model.y_coefficients[1] - 50.0).abs() < 1e-6);
        assert!((model.y_coefficients[2] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_exact_quadratic_is_recovered() {
        let f = |x: f64| 0.5 * x * x - 3.0 * x + 7.0;
        let xs = [10.0, 12.0, 15.0, 19.0, 22.0];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let c = fit_quadratic(&xs, &ys).unwrap();
        assert!((c[0] - 0.5).abs() < 1e-8);
        assert!((c[1] + 3.0).abs() < 1e-6);
        assert!((c[2] - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_too_few_samples_is_not_ready() {
        let samples = vec![
            sample(0.0, 0.0, 0.0, 0.0),
            sample(1.0, 1.0, 100.0, 100.0),
            sample(2.0, 2.0, 200.0, 200.0),
        ];
        assert_eq!(fit(&samples), Err(FitError::NotReady { have: 3, need: 4 }));
        assert_eq!(fit(&[]), Err(FitError::NotReady { have: 0, need: 4 }));
    }

    #[test]
    fn test_identical_eye_x_is_degenerate() {
        let samples: Vec<_> = (0..6)
            .map(|i| sample(5.0, i as f64, i as f64 * 10.0, i as f64 * 10.0))
            .collect();
        assert_eq!(
            fit(&samples),
            Err(FitError::Degenerate { axis: Axis::X })
        );
    }

    #[test]
    fn test_two_distinct_positions_is_degenerate() {
        let samples = vec![
            sample(1.0, 0.0, 10.0, 0.0),
            sample(1.0, 1.0, 10.0, 1.0),
            sample(2.0, 2.0, 20.0, 2.0),
            sample(2.0, 3.0, 20.0, 3.0),
        ];
        assert_eq!(
            fit(&samples),
            Err(FitError::Degenerate { axis: Axis::X })
        );
    }

    #[test]
    fn test_non_finite_input_is_degenerate() {
        let samples = vec![
            sample(0.0, 0.0, 0.0, 0.0),
            sample(1.0, 1.0, f64::NAN, 1.0),
            sample(2.0, 2.0, 2.0, 2.0),
            sample(3.0, 3.0, 3.0, 3.0),
        ];
        assert_eq!(
            fit(&samples),
            Err(FitError::Degenerate { axis: Axis::X })
        );
    }

    #[test]
    fn test_predict_applies_each_axis() {
        let model = RegressionModel {
            x_coefficients: [1.0, 0.0, 0.0],
            y_coefficients: [0.0, 2.0, 1.0],
        };
        let p = model.predict(Point2D::new(3.0, 4.0));
        assert_eq!(p, Point2D::new(9.0, 9.0));
    }

    #[test]
    fn test_not_ready_message() {
        let err = FitError::NotReady { have: 1, need: 4 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 4 calibration samples, have 1"
        );
    }

    proptest! {
        #[test]
        fn exact_quadratics_are_reproduced(
            a in -5.0f64..5.0,
            b in -100.0f64..100.0,
            c in -500.0f64..500.0,
            start in -10.0f64..10.0,
            step in 0.5f64..5.0,
        ) {
            let xs: Vec<f64> = (0..5).map(|i| start + step * i as f64).collect();
            let ys: Vec<f64> = xs.iter().map(|&x| evaluate_quadratic(&[a, b, c], x)).collect();
            let coefficients = fit_quadratic(&xs, &ys).unwrap();
            for (&x, &y) in xs.iter().zip(&ys) {
                let predicted = evaluate_quadratic(&coefficients, x);
                prop_assert!((predicted - y).abs() <= 1e-6 * (1.0 + y.abs()));
            }
        }
    }
}
