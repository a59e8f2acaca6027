//! Matrix arithmetic

use numina_core::{timed, MathError, TimedResult};
use crate::decompose::LuFactors;
use crate::helpers::{check_matmul_dims, check_square};
use crate::types::Matrix;

/// Determinant magnitude at or below which a matrix is treated as singular
pub const SINGULAR_EPSILON: f64 = 1e-12;

/// Matrix product `A × B`, dimensions `A.rows × B.cols`
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<TimedResult<Matrix>, MathError> {
    check_matmul_dims(a, b, "multiply")?;
    timed(a.len() + b.len(), || {
        let (n, inner, p) = (a.rows(), a.cols(), b.cols());
        let mut out = Matrix::zeros(n, p)?;
        let (ad, bd) = (a.data(), b.data());
        let od = out.data_mut();
        // i-k-j order keeps the inner loop on contiguous rows of B
        for i in 0..n {
            for k in 0..inner {
                let aik = ad[i * inner + k];
                if aik == 0.0 {
                    continue;
                }
                let b_row = &bd[k * p..(k + 1) * p];
                let o_row = &mut od[i * p..(i + 1) * p];
                for (o, bkj) in o_row.iter_mut().zip(b_row) {
                    *o += aik * bkj;
                }
            }
        }
        Ok(out)
    })
}

/// Inverse from the same LU factors that give the determinant
pub fn inverse(m: &Matrix) -> Result<TimedResult<Matrix>, MathError> {
    check_square(m, "inverse")?;
    timed(m.len(), || {
        let lu = LuFactors::new(m)?;
        if lu.determinant().abs() <= SINGULAR_EPSILON {
            return Err(MathError::singular_matrix()
                .with_suggestion("Check for linearly dependent rows"));
        }
        lu.inverse()
    })
}

/// Transpose, timed like the other kernels
pub fn transpose(m: &Matrix) -> Result<TimedResult<Matrix>, MathError> {
    timed(m.len(), || Ok(m.transpose()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use numina_core::ErrorKind;

    #[test]
    fn test_multiply() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![5.0, 6.0], vec![7.0, 8.0]]).unwrap();
        let c = multiply(&a, &b).unwrap().value;
        assert_eq!(c.to_rows(), vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
    }

    #[test]
    fn test_multiply_rectangular() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![1.0], vec![1.0], vec![1.0]]).unwrap();
        let c = multiply(&a, &b).unwrap();
        assert_eq!(c.value.rows(), 1);
        assert_eq!(c.value.cols(), 1);
        assert_eq!(c.value.data(), &[6.0]);
        assert_eq!(c.metrics.input_size, 6);
        assert!(c.execution_time_ms() >= 0.0);
    }

    #[test]
    fn test_multiply_dimension_mismatch() {
        let a = Matrix::zeros(2, 3).unwrap();
        let err = multiply(&a, &a).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DimensionMismatch);
    }

    #[test]
    fn test_multiply_100x100() {
        let data: Vec<f64> = (0..10_000).map(|i| (i % 17) as f64).collect();
        let a = Matrix::new(100, 100, data).unwrap();
        let id = Matrix::identity(100).unwrap();
        let c = multiply(&a, &id).unwrap().value;
        assert_eq!(c, a);
    }

    #[test]
    fn test_inverse_times_a_is_identity() {
        let a = Matrix::from_rows(vec![
            vec![4.0, 7.0, 2.0],
            vec![3.0, 6.0, 1.0],
            vec![2.0, 5.0, 3.0],
        ])
        .unwrap();
        let inv = inverse(&a).unwrap().value;
        let prod = multiply(&inv, &a).unwrap().value;
        let diff = prod.max_abs_diff(&Matrix::identity(3).unwrap()).unwrap();
        assert!(diff <= 1e-6);
    }

    #[test]
    fn test_inverse_singular() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        let err = inverse(&a).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SingularMatrix);
    }

    #[test]
    fn test_inverse_near_singular() {
        // det = 1e-13, inside the singular band
        let a = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1e-13]]).unwrap();
        assert_eq!(inverse(&a).unwrap_err().kind, ErrorKind::SingularMatrix);
    }

    #[test]
    fn test_inverse_non_square() {
        let err = inverse(&Matrix::zeros(2, 3).unwrap()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DimensionMismatch);
    }
}
