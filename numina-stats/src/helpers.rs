//! Helper functions for statistics

use numina_core::MathError;

/// Require at least one value
pub fn require_non_empty(numbers: &[f64], func: &str) -> Result<(), MathError> {
    if numbers.is_empty() {
        return Err(MathError::empty_input(func));
    }
    Ok(())
}

/// Require at least `min` values
pub fn require_min_count(numbers: &[f64], min: usize, func: &str) -> Result<(), MathError> {
    if numbers.len() < min {
        return Err(MathError::insufficient_data(func, min, numbers.len()));
    }
    Ok(())
}

/// Paired sequences: equal lengths, at least two points
pub fn require_pairs(x: &[f64], y: &[f64], func: &str) -> Result<(), MathError> {
    require_non_empty(x, func)?;
    require_non_empty(y, func)?;
    if x.len() != y.len() {
        return Err(MathError::dimension_mismatch(format!(
            "{}() needs sequences of equal length, got {} and {}",
            func,
            x.len(),
            y.len()
        )));
    }
    require_min_count(x, 2, func)
}

pub fn sum(numbers: &[f64]) -> f64 {
    numbers.iter().sum()
}

/// Arithmetic mean; callers check for empty input
pub fn mean(numbers: &[f64]) -> f64 {
    sum(numbers) / numbers.len() as f64
}

/// Variance, dividing by `n` (population) or `n - 1` (sample)
pub fn variance_impl(numbers: &[f64], sample: bool, func: &str) -> Result<f64, MathError> {
    require_non_empty(numbers, func)?;
    if sample {
        require_min_count(numbers, 2, func)?;
    }

    let m = mean(numbers);
    let ss: f64 = numbers.iter().map(|x| (x - m) * (x - m)).sum();
    let divisor = if sample { numbers.len() - 1 } else { numbers.len() };
    Ok(ss / divisor as f64)
}

/// Sum of co-deviations from the means; used by covariance, correlation
/// and regression.
pub fn co_deviation(x: &[f64], y: &[f64]) -> f64 {
    let (mx, my) = (mean(x), mean(y));
    x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum()
}

pub fn sorted(numbers: &[f64]) -> Vec<f64> {
    let mut v = numbers.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use numina_core::ErrorKind;

    #[test]
    fn test_variance_impl() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(variance_impl(&data, false, "variance").unwrap(), 4.0);
        assert!((variance_impl(&data, true, "variance").unwrap() - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_needs_two() {
        let err = variance_impl(&[1.0], true, "sample_variance").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InsufficientData);
    }

    #[test]
    fn test_require_pairs() {
        assert_eq!(
            require_pairs(&[1.0, 2.0], &[1.0], "corr").unwrap_err().kind,
            ErrorKind::DimensionMismatch
        );
        assert_eq!(
            require_pairs(&[1.0], &[1.0], "corr").unwrap_err().kind,
            ErrorKind::InsufficientData
        );
        assert_eq!(
            require_pairs(&[], &[], "corr").unwrap_err().kind,
            ErrorKind::EmptyInput
        );
    }

    #[test]
    fn test_sorted() {
        assert_eq!(sorted(&[3.0, -1.0, 2.0]), vec![-1.0, 2.0, 3.0]);
    }
}
