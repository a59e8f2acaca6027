//! Sequence transforms

use numina_core::{timed, MathError, TimedResult};
use crate::helpers::require_non_empty;

/// Means of every sliding window of `window` values.
///
/// Output length is `data.len() - window + 1`.
pub fn moving_average(data: &[f64], window: usize) -> Result<TimedResult<Vec<f64>>, MathError> {
    require_non_empty(data, "moving_average")?;
    if window == 0 || window > data.len() {
        return Err(MathError::invalid_argument(format!(
            "moving_average() window must be between 1 and {}, got {}",
            data.len(),
            window
        )));
    }
    timed(data.len(), || {
        let w = window as f64;
        let mut out = Vec::with_capacity(data.len() - window + 1);
        let mut acc: f64 = data[..window].iter().sum();
        out.push(acc / w);
        for i in window..data.len() {
            acc += data[i] - data[i - window];
            out.push(acc / w);
        }
        Ok(out)
    })
}
