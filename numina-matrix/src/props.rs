//! Scalar properties of a matrix

use numina_core::{timed, MathError, TimedResult};
use crate::decompose::LuFactors;
use crate::helpers::check_square;
use crate::types::Matrix;

/// Determinant by LU elimination with partial pivoting.
///
/// Singular input is a valid answer here: the result is 0, not an error.
pub fn determinant(m: &Matrix) -> Result<TimedResult<f64>, MathError> {
    check_square(m, "determinant")?;
    timed(m.len(), || Ok(LuFactors::new(m)?.determinant()))
}

/// Sum of the diagonal
pub fn trace(m: &Matrix) -> Result<TimedResult<f64>, MathError> {
    check_square(m, "trace")?;
    timed(m.len(), || {
        Ok((0..m.rows()).filter_map(|i| m.get(i, i)).sum())
    })
}
