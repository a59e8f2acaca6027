//! Result formatter
//!
//! Renders results and metrics as display text. Pure: no state, no I/O.

use numina_core::{EvaluationMetrics, EvaluationResult};

/// Values at or above this magnitude switch to scientific notation
const SCIENTIFIC_UPPER: f64 = 1e10;
/// Non-zero values below this magnitude switch to scientific notation
const SCIENTIFIC_LOWER: f64 = 1e-6;
/// Integral values below this magnitude print without a fraction
const INTEGER_LIMIT: f64 = 1e15;
const DECIMAL_PLACES: usize = 10;

/// Display formatter
pub struct Formatter;

impl Formatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_number(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "∞" } else { "-∞" }.to_string();
        }
        if value == 0.0 {
            return "0".to_string();
        }

        let magnitude = value.abs();
        if magnitude >= SCIENTIFIC_UPPER || magnitude < SCIENTIFIC_LOWER {
            return scientific(value);
        }
        if value.fract() == 0.0 && magnitude < INTEGER_LIMIT {
            return format!("{}", value as i64);
        }
        trim_fraction(&format!("{:.*}", DECIMAL_PLACES, value)).to_string()
    }

    /// Display text for one result
    pub fn format_result(&self, result: &EvaluationResult) -> String {
        match result {
            EvaluationResult::Number { value } => self.format_number(*value),
            EvaluationResult::Symbolic { result, .. } => result.clone(),
            EvaluationResult::Error { message } => format!("Error: {}", message),
            EvaluationResult::NotImplemented { message } => format!("Not implemented: {}", message),
        }
    }

    /// Multi-line metrics report in a fixed order
    pub fn format_metrics(&self, metrics: &EvaluationMetrics) -> String {
        let mut lines = vec![
            format!("Parse time: {:.3} ms", metrics.parse_time_ms),
            format!("Eval time: {:.3} ms", metrics.eval_time_ms),
            format!("Total time: {:.3} ms", metrics.total_time_ms),
            format!("Peak memory: {:.3} KB", metrics.peak_memory_kb),
            format!("AST nodes: {}", metrics.ast_node_count),
            format!("Expression length: {}", metrics.expression_length),
        ];
        if let Some(ms) = metrics.delegate_call_time_ms {
            lines.push(format!("Delegate call: {:.3} ms", ms));
        }
        if let Some(ms) = metrics.conversion_time_ms {
            lines.push(format!("Conversion: {:.3} ms", ms));
        }
        lines.join("\n")
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

/// `1.500000000e12` → `1.5e12`
fn scientific(value: f64) -> String {
    let text = format!("{:.9e}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => format!("{}e{}", trim_fraction(mantissa), exponent),
        None => text,
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
