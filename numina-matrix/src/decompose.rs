//! Matrix decompositions
//!
//! `LuFactors` wraps nalgebra's LU and is computed once for both
//! `determinant` and `inverse`. Eigenvalues go through nalgebra's real
//! Schur form.

use std::cmp::Ordering;
use nalgebra::linalg::{Schur, LU};
use nalgebra::{DVector, Dyn};
use numina_core::{timed, MathError, TimedResult};
use serde::Serialize;
use crate::helpers::check_square;
use crate::types::Matrix;

/// Iteration budget for the Schur (QR) iteration
pub const EIGEN_MAX_ITERATIONS: usize = 1000;

// ============================================================================
// LU - PA = LU with partial pivoting
// ============================================================================

/// LU factors of a square matrix, computed once and shared by the
/// determinant, linear solves and the inverse.
#[derive(Debug, Clone)]
pub struct LuFactors {
    n: usize,
    lu: LU<f64, Dyn, Dyn>,
}

impl LuFactors {
    pub fn new(m: &Matrix) -> Result<Self, MathError> {
        check_square(m, "lu")?;
        Ok(Self { n: m.rows(), lu: m.to_dmatrix().lu() })
    }

    pub fn size(&self) -> usize {
        self.n
    }

    /// Zero for a singular matrix
    pub fn determinant(&self) -> f64 {
        self.lu.determinant()
    }

    /// Solve `A x = b`
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>, MathError> {
        if b.len() != self.n {
            return Err(MathError::dimension_mismatch(format!(
                "solve: right-hand side has {} values, expected {}",
                b.len(),
                self.n
            )));
        }
        self.lu
            .solve(&DVector::from_column_slice(b))
            .map(|x| x.as_slice().to_vec())
            .ok_or_else(MathError::singular_matrix)
    }

    pub fn inverse(&self) -> Result<Matrix, MathError> {
        self.lu
            .try_inverse()
            .map(|inv| Matrix::from_dmatrix(&inv))
            .ok_or_else(MathError::singular_matrix)
    }
}

// ============================================================================
// EIGENVALUES - real Schur form
// ============================================================================

/// One eigenvalue as a real + imaginary pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Eigenvalue {
    pub re: f64,
    pub im: f64,
}

impl Eigenvalue {
    pub fn is_real(&self) -> bool {
        self.im == 0.0
    }
}

/// Eigenvalues of a square matrix, sorted by descending real part.
///
/// Complex eigenvalues come in conjugate pairs. Fails with `NoConvergence`
/// when the QR iteration exceeds `EIGEN_MAX_ITERATIONS`.
pub fn eigenvalues(m: &Matrix) -> Result<TimedResult<Vec<Eigenvalue>>, MathError> {
    eigenvalues_with_limit(m, EIGEN_MAX_ITERATIONS)
}

/// Eigenvalues under an explicit iteration budget; 0 is raised to 1
/// because nalgebra reads 0 as unbounded
pub(crate) fn eigenvalues_with_limit(
    m: &Matrix,
    max_iterations: usize,
) -> Result<TimedResult<Vec<Eigenvalue>>, MathError> {
    check_square(m, "eigenvalues")?;
    let max_iterations = max_iterations.max(1);
    timed(m.len(), || {
        let schur = Schur::try_new(m.to_dmatrix(), f64::EPSILON, max_iterations)
            .ok_or_else(|| MathError::no_convergence("eigenvalues", max_iterations))?;

        let mut values: Vec<Eigenvalue> = schur
            .complex_eigenvalues()
            .iter()
            .map(|c| Eigenvalue { re: c.re, im: c.im })
            .collect();

        values.sort_by(|a, b| {
            b.re.partial_cmp(&a.re)
                .unwrap_or(Ordering::Equal)
                .then(b.im.partial_cmp(&a.im).unwrap_or(Ordering::Equal))
        });
        tracing::trace!(n = m.rows(), "eigenvalues computed");
        Ok(values)
    })
}
