//! Precondition checks shared by the matrix and vector kernels

use numina_core::MathError;
use crate::types::Matrix;

/// Check that two matrices have compatible dimensions for multiplication
pub fn check_matmul_dims(a: &Matrix, b: &Matrix, func: &str) -> Result<(), MathError> {
    if a.cols() != b.rows() {
        return Err(MathError::dimension_mismatch(format!(
            "{}: incompatible dimensions {}×{} and {}×{}",
            func,
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    Ok(())
}

/// Check that a matrix is square
pub fn check_square(m: &Matrix, func: &str) -> Result<(), MathError> {
    if !m.is_square() {
        return Err(MathError::dimension_mismatch(format!(
            "{}: requires square matrix, got {}×{}",
            func,
            m.rows(),
            m.cols()
        )));
    }
    Ok(())
}

/// Check that two vectors have the same length
pub fn check_same_len(u: &[f64], v: &[f64], func: &str) -> Result<(), MathError> {
    if u.len() != v.len() {
        return Err(MathError::dimension_mismatch(format!(
            "{}: vectors have lengths {} and {}",
            func,
            u.len(),
            v.len()
        )));
    }
    Ok(())
}

pub fn require_non_empty(v: &[f64], func: &str) -> Result<(), MathError> {
    if v.is_empty() {
        return Err(MathError::empty_input(func));
    }
    Ok(())
}
