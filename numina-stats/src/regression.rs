//! Ordinary least squares

use numina_core::{timed, MathError, TimedResult};
use serde::Serialize;
use crate::helpers::{co_deviation, mean, require_pairs};

/// Fitted line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; 1 when y is constant
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<TimedResult<LinearFit>, MathError> {
    require_pairs(x, y, "linear_regression")?;
    timed(x.len() + y.len(), || {
        let sxx = co_deviation(x, x);
        if sxx == 0.0 {
            return Err(MathError::invalid_argument(
                "linear_regression() needs at least two distinct x values",
            ));
        }
        let sxy = co_deviation(x, y);
        let syy = co_deviation(y, y);

        let slope = sxy / sxx;
        let intercept = mean(y) - slope * mean(x);
        let r_squared = if syy == 0.0 {
            1.0
        } else {
            (sxy * sxy) / (sxx * syy)
        };
        Ok(LinearFit { slope, intercept, r_squared })
    })
}
