//! Numina Core - Fundamental types
//!
//! This crate provides the core types used throughout Numina:
//! - `MathError`: Structured errors with a shared taxonomy
//! - `EvaluationResult`: Number, symbolic, error or not-implemented outcome
//! - `EvaluationMetrics` / `TimedResult`: Performance telemetry

mod error;
mod metrics;
mod result;

pub use error::{ErrorKind, MathError};
pub use metrics::{
    duration_ms, elapsed_ms, timed, EvaluationMetrics, KernelMetrics, MetricsRecorder, Phase,
    TimedResult,
};
pub use result::EvaluationResult;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{timed, ErrorKind, EvaluationResult, MathError, TimedResult};
}
