//! Central tendency: mean, median

use numina_core::{timed, MathError, TimedResult};
use crate::helpers::{self, require_non_empty, sorted};

/// Arithmetic mean
pub fn mean(data: &[f64]) -> Result<TimedResult<f64>, MathError> {
    require_non_empty(data, "mean")?;
    timed(data.len(), || Ok(helpers::mean(data)))
}

/// Middle value; the average of the two middle values for even length
pub fn median(data: &[f64]) -> Result<TimedResult<f64>, MathError> {
    require_non_empty(data, "median")?;
    timed(data.len(), || {
        let s = sorted(data);
        let n = s.len();
        if n % 2 == 1 {
            Ok(s[n / 2])
        } else {
            Ok((s[n / 2 - 1] + s[n / 2]) / 2.0)
        }
    })
}
