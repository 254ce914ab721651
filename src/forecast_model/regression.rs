//! Ordinary least squares linear regression with an intercept.
//!
//! Features and target are centered and the coefficients are the minimum-norm
//! least squares solution, taken from a singular value decomposition of the
//! centered design matrix. Perfectly collinear or constant features are
//! therefore allowed: they share weight instead of making the fit fail.

use crate::forecast_model::error::RegressionError;
use nalgebra::{DMatrix, DVector};

const MAX_ITERATIONS: usize = 1000;
/// Singular values below this fraction of the largest one are treated as zero.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    pub fn fit<R: AsRef<[f64]>>(rows: &[R], targets: &[f64]) -> Result<Self, RegressionError> {
        let n = rows.len();
        if n == 0 {
            return Err(RegressionError::NoRows);
        }
        if targets.len() != n {
            return Err(RegressionError::TargetCountMismatch {
                rows: n,
                targets: targets.len(),
            });
        }
        let width = rows[0].as_ref().len();
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != width {
                return Err(RegressionError::FeatureCountMismatch {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(RegressionError::NonFinite);
            }
        }
        if targets.iter().any(|v| !v.is_finite()) {
            return Err(RegressionError::NonFinite);
        }

        let design = DMatrix::from_fn(n, width, |i, j| rows[i].as_ref()[j]);
        let observed = DVector::from_column_slice(targets);
        let feature_means = design.row_mean().transpose();
        let target_mean = observed.mean();

        let mut centered = design;
        for (j, mut column) in centered.column_iter_mut().enumerate() {
            column.add_scalar_mut(-feature_means[j]);
        }
        let centered_targets = observed.add_scalar(-target_mean);

        let coefficients = min_norm_solve(centered, &centered_targets)?;
        let intercept = target_mean - coefficients.dot(&feature_means);

        Ok(Self {
            coefficients: coefficients.iter().copied().collect(),
            intercept,
        })
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Minimum-norm `b` minimising `|a·b - y|`.
fn min_norm_solve(a: DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, RegressionError> {
    let width = a.ncols();
    let svd = a
        .try_svd(true, true, f64::EPSILON, MAX_ITERATIONS)
        .ok_or(RegressionError::NoConvergence)?;
    let largest = svd.singular_values.max();
    if largest.is_nan() || largest <= 0.0 {
        return Ok(DVector::zeros(width));
    }
    svd.solve(y, largest * RANK_TOLERANCE)
        .map_err(RegressionError::Decomposition)
}
