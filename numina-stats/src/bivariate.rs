//! Two-variable statistics: covariance, correlation

use numina_core::{timed, MathError, TimedResult};
use crate::helpers::{co_deviation, require_pairs};

/// Sample covariance (n - 1 divisor)
pub fn covariance(x: &[f64], y: &[f64]) -> Result<TimedResult<f64>, MathError> {
    require_pairs(x, y, "covariance")?;
    timed(x.len() + y.len(), || Ok(co_deviation(x, y) / (x.len() - 1) as f64))
}

/// Pearson correlation coefficient, clamped to [-1, 1]
pub fn correlation(x: &[f64], y: &[f64]) -> Result<TimedResult<f64>, MathError> {
    require_pairs(x, y, "correlation")?;
    timed(x.len() + y.len(), || {
        let sxy = co_deviation(x, y);
        let sxx = co_deviation(x, x);
        let syy = co_deviation(y, y);
        if sxx == 0.0 || syy == 0.0 {
            return Err(MathError::invalid_argument(
                "correlation() is undefined for a constant sequence",
            ));
        }
        Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use numina_core::ErrorKind;

    #[test]
    fn test_correlation_with_self() {
        let x = [1.5, -2.0, 3.25, 10.0, 0.0, 7.0];
        assert!((correlation(&x, &x).unwrap().value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_negative() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [8.0, 6.0, 4.0, 2.0];
        assert!((correlation(&x, &y).unwrap().value + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_preconditions() {
        assert_eq!(
            correlation(&[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err().kind,
            ErrorKind::DimensionMismatch
        );
        assert_eq!(
            correlation(&[1.0], &[2.0]).unwrap_err().kind,
            ErrorKind::InsufficientData
        );
        assert_eq!(
            correlation(&[1.0, 1.0], &[2.0, 3.0]).unwrap_err().kind,
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_covariance() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 6.0];
        assert!((covariance(&x, &y).unwrap().value - 2.0).abs() < 1e-12);
    }
}
