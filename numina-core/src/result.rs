//! Evaluation results
//!
//! Exactly one variant is active per evaluation. Errors are values here
//! too: the pipeline turns every failure into `Error` or `NotImplemented`.

use crate::MathError;
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvaluationResult {
    Number {
        value: f64,
    },
    Symbolic {
        result: String,
        /// Typeset (LaTeX) rendering
        rendering: String,
        original_expression: String,
    },
    Error {
        message: String,
    },
    NotImplemented {
        message: String,
    },
}

impl EvaluationResult {
    pub fn number(value: f64) -> Self {
        EvaluationResult::Number { value }
    }

    pub fn symbolic(
        result: impl Into<String>,
        rendering: impl Into<String>,
        original_expression: impl Into<String>,
    ) -> Self {
        EvaluationResult::Symbolic {
            result: result.into(),
            rendering: rendering.into(),
            original_expression: original_expression.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        EvaluationResult::Error { message: message.into() }
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        EvaluationResult::NotImplemented { message: message.into() }
    }

    // ========== Safe Accessors (never panic) ==========

    pub fn as_number(&self) -> Option<f64> {
        match self {
            EvaluationResult::Number { value } => Some(*value),
            _ => None,
        }
    }

    pub fn as_symbolic(&self) -> Option<&str> {
        match self {
            EvaluationResult::Symbolic { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Message of an `Error` or `NotImplemented` result
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            EvaluationResult::Error { message } | EvaluationResult::NotImplemented { message } => {
                Some(message)
            }
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            EvaluationResult::Number { .. } | EvaluationResult::Symbolic { .. }
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            EvaluationResult::Number { .. } => "Number",
            EvaluationResult::Symbolic { .. } => "Symbolic",
            EvaluationResult::Error { .. } => "Error",
            EvaluationResult::NotImplemented { .. } => "NotImplemented",
        }
    }
}

impl From<MathError> for EvaluationResult {
    /// Unsupported delegate requests degrade to `NotImplemented`; every
    /// other failure becomes an `Error` carrying the user-facing message.
    fn from(err: MathError) -> Self {
        match err.kind {
            crate::ErrorKind::DelegateUnsupported => EvaluationResult::not_implemented(err.message),
            _ => EvaluationResult::error(err.message),
        }
    }
}
