//! Dispersion: variance and standard deviation
//!
//! `standard_deviation` and `variance` are the population forms (divide
//! by n). The `sample_*` variants divide by n - 1 and need two values.

use numina_core::{timed, MathError, TimedResult};
use crate::helpers::{require_min_count, require_non_empty, variance_impl};

/// Population variance
pub fn variance(data: &[f64]) -> Result<TimedResult<f64>, MathError> {
    require_non_empty(data, "variance")?;
    timed(data.len(), || variance_impl(data, false, "variance"))
}

/// Sample (unbiased) variance
pub fn sample_variance(data: &[f64]) -> Result<TimedResult<f64>, MathError> {
    require_non_empty(data, "sample_variance")?;
    require_min_count(data, 2, "sample_variance")?;
    timed(data.len(), || variance_impl(data, true, "sample_variance"))
}

/// Population standard deviation: sqrt of the mean squared deviation
pub fn standard_deviation(data: &[f64]) -> Result<TimedResult<f64>, MathError> {
    require_non_empty(data, "stddev")?;
    timed(data.len(), || Ok(variance_impl(data, false, "stddev")?.sqrt()))
}

/// Sample standard deviation (n - 1 divisor)
pub fn sample_standard_deviation(data: &[f64]) -> Result<TimedResult<f64>, MathError> {
    require_non_empty(data, "sample_stddev")?;
    require_min_count(data, 2, "sample_stddev")?;
    timed(data.len(), || Ok(variance_impl(data, true, "sample_stddev")?.sqrt()))
}
