//! Performance metrics
//!
//! `EvaluationMetrics` is built once per evaluation by a `MetricsRecorder`.
//! Engine kernels return `TimedResult<T>`, which pairs a value with
//! `KernelMetrics`.

use crate::MathError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Milliseconds elapsed since `start`
pub fn elapsed_ms(start: Instant) -> f64 {
    duration_ms(start.elapsed())
}

pub fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Metrics attached to every evaluation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMetrics {
    pub parse_time_ms: f64,
    pub eval_time_ms: f64,
    pub total_time_ms: f64,
    /// Estimated from the size of the token buffer and AST
    #[serde(rename = "peakMemoryKB")]
    pub peak_memory_kb: f64,
    pub ast_node_count: usize,
    /// Character count of the input
    pub expression_length: usize,
    /// Time spent waiting on the symbolic delegate
    #[serde(rename = "pythonCallTimeMs", skip_serializing_if = "Option::is_none")]
    pub delegate_call_time_ms: Option<f64>,
    /// Time spent converting the delegate reply into a result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_time_ms: Option<f64>,
}

/// Pipeline phases timed by the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Eval,
    DelegateCall,
    Conversion,
}

/// Accumulates phase timings for one evaluation
#[derive(Debug)]
pub struct MetricsRecorder {
    started: Instant,
    metrics: EvaluationMetrics,
}

impl MetricsRecorder {
    pub fn start(expression: &str) -> Self {
        Self {
            started: Instant::now(),
            metrics: EvaluationMetrics {
                expression_length: expression.chars().count(),
                ..EvaluationMetrics::default()
            },
        }
    }

    /// Run `f`, charging its wall time to `phase`.
    pub fn time<T>(&mut self, phase: Phase, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.add(phase, elapsed_ms(start));
        out
    }

    pub fn add(&mut self, phase: Phase, ms: f64) {
        let m = &mut self.metrics;
        match phase {
            Phase::Parse => m.parse_time_ms += ms,
            Phase::Eval => m.eval_time_ms += ms,
            Phase::DelegateCall => {
                *m.delegate_call_time_ms.get_or_insert(0.0) += ms;
            }
            Phase::Conversion => {
                *m.conversion_time_ms.get_or_insert(0.0) += ms;
            }
        }
    }

    /// Record AST size; the memory estimate keeps the largest value seen.
    pub fn observe_ast(&mut self, node_count: usize, approx_bytes: usize) {
        self.metrics.ast_node_count += node_count;
        let kb = approx_bytes as f64 / 1024.0;
        if kb > self.metrics.peak_memory_kb {
            self.metrics.peak_memory_kb = kb;
        }
    }

    pub fn finish(mut self) -> EvaluationMetrics {
        self.metrics.total_time_ms = elapsed_ms(self.started);
        self.metrics
    }
}

/// Telemetry returned by every engine kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelMetrics {
    pub execution_time_ms: f64,
    /// Number of scalar inputs the kernel consumed
    pub input_size: usize,
}

/// A kernel output plus its execution time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedResult<T> {
    pub value: T,
    pub metrics: KernelMetrics,
}

impl<T> TimedResult<T> {
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn execution_time_ms(&self) -> f64 {
        self.metrics.execution_time_ms
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TimedResult<U> {
        TimedResult {
            value: f(self.value),
            metrics: self.metrics,
        }
    }
}

/// Time a fallible kernel.
pub fn timed<T>(
    input_size: usize,
    kernel: impl FnOnce() -> Result<T, MathError>,
) -> Result<TimedResult<T>, MathError> {
    let start = Instant::now();
    let value = kernel()?;
    Ok(TimedResult {
        value,
        metrics: KernelMetrics {
            execution_time_ms: elapsed_ms(start),
            input_size,
        },
    })
}
