//! Vector engine: dot, norm, add
//!
//! Vectors are plain `f64` slices; binary operations require equal lengths.

use numina_core::{timed, MathError, TimedResult};
use crate::helpers::{check_same_len, require_non_empty};

pub fn dot(u: &[f64], v: &[f64]) -> Result<TimedResult<f64>, MathError> {
    check_same_len(u, v, "dot")?;
    require_non_empty(u, "dot")?;
    timed(u.len() + v.len(), || Ok(dot_impl(u, v)))
}

/// Euclidean (L2) norm
pub fn norm(v: &[f64]) -> Result<TimedResult<f64>, MathError> {
    require_non_empty(v, "norm")?;
    timed(v.len(), || Ok(dot_impl(v, v).sqrt()))
}

/// Element-wise sum
pub fn add(u: &[f64], v: &[f64]) -> Result<TimedResult<Vec<f64>>, MathError> {
    check_same_len(u, v, "add")?;
    require_non_empty(u, "add")?;
    timed(u.len() + v.len(), || {
        Ok(u.iter().zip(v).map(|(a, b)| a + b).collect())
    })
}

fn dot_impl(u: &[f64], v: &[f64]) -> f64 {
    u.iter().zip(v).map(|(a, b)| a * b).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use numina_core::ErrorKind;

    #[test]
    fn test_dot() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap().value, 32.0);
    }

    #[test]
    fn test_dot_commutes() {
        let u = [0.5, -1.25, 3.0, 7.5];
        let v = [2.0, 4.0, -0.125, 1.0];
        assert_eq!(dot(&u, &v).unwrap().value, dot(&v, &u).unwrap().value);
    }

    #[test]
    fn test_dot_length_mismatch() {
        let err = dot(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DimensionMismatch);
    }

    #[test]
    fn test_norm() {
        assert_eq!(norm(&[3.0, 4.0]).unwrap().value, 5.0);
        assert_eq!(norm(&[0.0, 0.0, 0.0]).unwrap().value, 0.0);
        assert!(norm(&[-2.0, -7.0]).unwrap().value >= 0.0);
    }

    #[test]
    fn test_add() {
        let r = add(&[1.0, 2.0], &[10.0, 20.0]).unwrap();
        assert_eq!(r.value, vec![11.0, 22.0]);
        assert_eq!(r.metrics.input_size, 4);
        assert!(add(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_empty_vectors() {
        assert_eq!(norm(&[]).unwrap_err().kind, ErrorKind::EmptyInput);
        assert_eq!(dot(&[], &[]).unwrap_err().kind, ErrorKind::EmptyInput);
    }
}
