//! Numina Stats - Descriptive statistics
//!
//! All kernels take ordered `f64` sequences and return a `TimedResult`.
//! Empty input always fails with `EmptyInput`; nothing falls back to zero.
//!
//! Standard deviation and variance are population statistics (divide by
//! n). Sample forms are available as `sample_standard_deviation` and
//! `sample_variance`.

mod bivariate;
mod central;
mod dispersion;
mod helpers;
mod regression;
mod transform;

pub use bivariate::{correlation, covariance};
pub use central::{mean, median};
pub use dispersion::{sample_standard_deviation, sample_variance, standard_deviation, variance};
pub use regression::{linear_regression, LinearFit};
pub use transform::moving_average;
