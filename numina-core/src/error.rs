//! Structured errors
//!
//! Errors never crash the caller. Every public operation returns them as
//! values; the `Display` form is the short human-readable message only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error taxonomy shared by the parser, evaluator, engines and delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input text
    Parse,
    /// A variable (including `Ans`) with no binding
    UnboundVariable,
    DivisionByZero,
    /// Function argument outside its mathematical domain
    Domain,
    /// A form the numeric evaluator hands to the symbolic delegate
    UnsupportedForm,
    /// Wrong arity, bad window size, bad sampling domain
    InvalidArgument,
    DimensionMismatch,
    SingularMatrix,
    EmptyInput,
    InsufficientData,
    /// Iterative kernel gave up after its iteration budget
    NoConvergence,
    DelegateTimeout,
    DelegateFailure,
    /// The symbolic backend cannot handle this request
    DelegateUnsupported,
}

impl ErrorKind {
    /// Stable machine-readable code, for logs only.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "PARSE_ERROR",
            ErrorKind::UnboundVariable => "UNDEFINED_VAR",
            ErrorKind::DivisionByZero => "DIV_ZERO",
            ErrorKind::Domain => "DOMAIN_ERROR",
            ErrorKind::UnsupportedForm => "UNSUPPORTED_FORM",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::DimensionMismatch => "DIMENSION_MISMATCH",
            ErrorKind::SingularMatrix => "SINGULAR_MATRIX",
            ErrorKind::EmptyInput => "EMPTY_INPUT",
            ErrorKind::InsufficientData => "INSUFFICIENT_DATA",
            ErrorKind::NoConvergence => "NO_CONVERGENCE",
            ErrorKind::DelegateTimeout => "DELEGATE_TIMEOUT",
            ErrorKind::DelegateFailure => "DELEGATE_FAILURE",
            ErrorKind::DelegateUnsupported => "DELEGATE_UNSUPPORTED",
        }
    }

    /// Domain and arithmetic failures raised while walking an AST.
    pub fn is_eval_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnboundVariable
                | ErrorKind::DivisionByZero
                | ErrorKind::Domain
                | ErrorKind::UnsupportedForm
                | ErrorKind::InvalidArgument
        )
    }

    /// Failures of the symbolic path.
    pub fn is_delegate_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::DelegateTimeout | ErrorKind::DelegateFailure | ErrorKind::DelegateUnsupported
        )
    }
}

/// Structured error value
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct MathError {
    pub kind: ErrorKind,

    /// Human-readable message
    pub message: String,

    /// Character offset into the input (parse errors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl MathError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
            suggestion: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set position
    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    // ========== Common Error Constructors ==========

    pub fn parse_error(position: usize, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Parse,
            format!("Parse error at position {}: {}", position, reason.into()),
        )
        .at(position)
    }

    pub fn div_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "Division by zero")
    }

    pub fn undefined_var(name: &str) -> Self {
        Self::new(ErrorKind::UnboundVariable, format!("Undefined variable: {}", name))
    }

    pub fn no_previous_answer() -> Self {
        Self::new(ErrorKind::UnboundVariable, "No previous answer to use for Ans")
            .with_suggestion("Evaluate an expression first")
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, format!("Domain error: {}", details.into()))
    }

    pub fn unsupported_form(name: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedForm,
            format!("{}() needs symbolic evaluation", name),
        )
    }

    pub fn arg_count(func: &str, expected: &str, got: usize) -> Self {
        Self::new(
            ErrorKind::InvalidArgument,
            format!("{}() expects {} arguments, got {}", func, expected, got),
        )
    }

    pub fn invalid_argument(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, details.into())
    }

    pub fn dimension_mismatch(details: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::DimensionMismatch,
            format!("Dimension mismatch: {}", details.into()),
        )
    }

    pub fn singular_matrix() -> Self {
        Self::new(ErrorKind::SingularMatrix, "Matrix is singular and has no inverse")
    }

    pub fn empty_input(op: &str) -> Self {
        Self::new(ErrorKind::EmptyInput, format!("{}() requires at least one value", op))
    }

    pub fn insufficient_data(op: &str, needed: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::InsufficientData,
            format!("{}() requires at least {} values, got {}", op, needed, got),
        )
    }

    pub fn no_convergence(op: &str, iterations: usize) -> Self {
        Self::new(
            ErrorKind::NoConvergence,
            format!("{}() did not converge after {} iterations", op, iterations),
        )
    }

    pub fn delegate_timeout() -> Self {
        Self::new(ErrorKind::DelegateTimeout, "symbolic evaluation timed out")
    }

    pub fn delegate_failure(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::DelegateFailure, details.into())
    }

    pub fn delegate_unsupported(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::DelegateUnsupported, details.into())
    }
}
