//! Graph sampling engine
//!
//! Evaluates expressions of `x` over an evenly spaced domain. Points that
//! fail to evaluate, or evaluate to NaN or ±∞, stay in the series with
//! `y = None` so the plot can draw a gap.

use rayon::prelude::*;
use serde::Serialize;

use numina_core::{timed, MathError, TimedResult};
use crate::ast::Expr;
use crate::eval::{Bindings, Evaluator};
use crate::parser::parse;

/// Variable bound at each sample point
pub const SAMPLE_VARIABLE: &str = "x";

/// Upper bound on points per series
pub const MAX_POINTS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePoint {
    pub x: f64,
    /// `None` where the expression is undefined or non-finite
    pub y: Option<f64>,
}

impl SamplePoint {
    pub fn is_finite(&self) -> bool {
        self.y.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeriesStatus {
    Complete,
    /// Some points are gaps
    Partial { failed_points: usize },
    /// Nothing was sampled, e.g. the expression does not parse
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub expression: String,
    pub points: Vec<SamplePoint>,
    pub status: SeriesStatus,
}

impl Series {
    pub fn is_complete(&self) -> bool {
        self.status == SeriesStatus::Complete
    }

    pub fn ys(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.y).collect()
    }

    fn failed(expression: &str, err: MathError) -> Self {
        Self {
            expression: expression.to_string(),
            points: Vec::new(),
            status: SeriesStatus::Failed { message: err.message },
        }
    }
}

fn check_domain(x_min: f64, x_max: f64, point_count: usize) -> Result<(), MathError> {
    if !x_min.is_finite() || !x_max.is_finite() || x_min >= x_max {
        return Err(MathError::invalid_argument(format!(
            "sample domain needs finite xMin < xMax, got [{}, {}]",
            x_min, x_max
        )));
    }
    if point_count < 2 || point_count > MAX_POINTS {
        return Err(MathError::invalid_argument(format!(
            "pointCount must be between 2 and {}, got {}",
            MAX_POINTS, point_count
        )));
    }
    Ok(())
}

/// Evenly spaced x values; the last one is exactly `x_max`
fn x_values(x_min: f64, x_max: f64, point_count: usize) -> Vec<f64> {
    let step = (x_max - x_min) / (point_count - 1) as f64;
    (0..point_count)
        .map(|i| if i == point_count - 1 { x_max } else { x_min + i as f64 * step })
        .collect()
}

fn sample_ast(expression: &str, ast: &Expr, xs: &[f64]) -> Series {
    let evaluator = Evaluator::new();
    let mut bindings = Bindings::new();
    let mut failed = 0;

    let points = xs
        .iter()
        .map(|&x| {
            bindings.set(SAMPLE_VARIABLE, x);
            let y = evaluator.eval(ast, &bindings).ok().filter(|y| y.is_finite());
            if y.is_none() {
                failed += 1;
            }
            SamplePoint { x, y }
        })
        .collect();

    let status = if failed == 0 {
        SeriesStatus::Complete
    } else {
        SeriesStatus::Partial { failed_points: failed }
    };
    Series { expression: expression.to_string(), points, status }
}

fn sample_series(expression: &str, xs: &[f64]) -> Series {
    match parse(expression) {
        Ok(parsed) => sample_ast(expression, &parsed.ast, xs),
        Err(e) => Series::failed(expression, e),
    }
}

/// Sample one expression at `point_count` points over `[x_min, x_max]`.
///
/// A parse failure is returned as a `Failed` series, not an error; only an
/// invalid domain is an error.
pub fn sample(
    expression: &str,
    x_min: f64,
    x_max: f64,
    point_count: usize,
) -> Result<TimedResult<Series>, MathError> {
    check_domain(x_min, x_max, point_count)?;
    timed(point_count, || {
        let xs = x_values(x_min, x_max, point_count);
        Ok(sample_series(expression, &xs))
    })
}

/// Sample several expressions over one shared domain, in parallel.
///
/// Each series carries its own status; one failure never aborts the rest.
pub fn sample_multiple(
    expressions: &[&str],
    x_min: f64,
    x_max: f64,
    point_count: usize,
) -> Result<TimedResult<Vec<Series>>, MathError> {
    check_domain(x_min, x_max, point_count)?;
    timed(point_count * expressions.len(), || {
        let xs = x_values(x_min, x_max, point_count);
        let series: Vec<Series> = expressions
            .par_iter()
            .map(|expr| sample_series(expr, &xs))
            .collect();
        tracing::debug!(series = series.len(), points = point_count, "sampled");
        Ok(series)
    })
}
