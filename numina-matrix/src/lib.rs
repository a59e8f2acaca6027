//! Numina Matrix - Dense linear algebra
//!
//! Stateless kernels over `Matrix` (row-major `f64`) and plain `f64`
//! vectors. Every kernel returns a `TimedResult` carrying its execution time.
//!
//! ## Matrix engine
//! - `multiply`, `inverse`, `transpose` (ops)
//! - `determinant`, `trace` (props)
//! - `LuFactors`, `eigenvalues` (decompose)
//!
//! ## Vector engine
//! - `dot`, `norm`, `add`

mod decompose;
mod helpers;
mod ops;
mod props;
mod types;
mod vector_ops;

pub use decompose::{eigenvalues, Eigenvalue, LuFactors, EIGEN_MAX_ITERATIONS};
pub use ops::{inverse, multiply, transpose, SINGULAR_EPSILON};
pub use props::{determinant, trace};
pub use types::Matrix;
pub use vector_ops::{add, dot, norm};
