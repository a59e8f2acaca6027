//! Symbolic delegate boundary
//!
//! Closed-form work (derivatives, integrals, equation solving) is handed to
//! an external capability behind the `SymbolicDelegate` trait. The core
//! only relies on the contract: one async call that can be timed, bounded
//! by a timeout, and can fail.

mod sympy;

pub use sympy::SympyDelegate;

use async_trait::async_trait;
use numina_core::MathError;
use serde::Serialize;
use thiserror::Error;

use crate::ast::Expr;

/// Operations a delegate may be asked to perform
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolicOp {
    Simplify,
    /// Simplify with the backend's default evaluation
    Evaluate,
    /// Simplify `lhs - rhs` and report whether it is identically zero
    Verify,
    Solve { variable: String },
    Differentiate { variable: String, order: u32 },
    Integrate { variable: String, bounds: Option<(Expr, Expr)> },
    Sum { variable: String, lower: Expr, upper: Expr },
    Limit { variable: String, point: Expr },
}

impl SymbolicOp {
    pub fn name(&self) -> &'static str {
        match self {
            SymbolicOp::Simplify => "simplify",
            SymbolicOp::Evaluate => "evaluate",
            SymbolicOp::Verify => "verify",
            SymbolicOp::Solve { .. } => "solve",
            SymbolicOp::Differentiate { .. } => "differentiate",
            SymbolicOp::Integrate { .. } => "integrate",
            SymbolicOp::Sum { .. } => "sum",
            SymbolicOp::Limit { .. } => "limit",
        }
    }

    pub fn variable(&self) -> Option<&str> {
        match self {
            SymbolicOp::Solve { variable }
            | SymbolicOp::Differentiate { variable, .. }
            | SymbolicOp::Integrate { variable, .. }
            | SymbolicOp::Sum { variable, .. }
            | SymbolicOp::Limit { variable, .. } => Some(variable),
            _ => None,
        }
    }
}

/// One request to the delegate
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicRequest {
    pub op: SymbolicOp,
    pub expression: Expr,
}

impl SymbolicRequest {
    pub fn new(op: SymbolicOp, expression: Expr) -> Self {
        Self { op, expression }
    }
}

/// Closed-form answer from a delegate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolicAnswer {
    pub result: String,
    /// LaTeX rendering
    pub latex: String,
    /// Set by `Verify`
    pub verified: Option<bool>,
    /// Time the backend reports for its own work
    pub backend_time_ms: Option<f64>,
}

#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("symbolic evaluation timed out")]
    Timeout,

    #[error("symbolic backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    Unsupported(String),
}

impl From<DelegateError> for MathError {
    fn from(err: DelegateError) -> Self {
        match err {
            DelegateError::Timeout => MathError::delegate_timeout(),
            DelegateError::Unsupported(msg) => MathError::delegate_unsupported(msg),
            other => MathError::delegate_failure(other.to_string()),
        }
    }
}

#[async_trait]
pub trait SymbolicDelegate: Send + Sync {
    /// Short backend name, for logs
    fn name(&self) -> &str;

    async fn solve(&self, request: &SymbolicRequest) -> Result<SymbolicAnswer, DelegateError>;
}

/// Delegate used when symbolic evaluation is switched off
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

#[async_trait]
impl SymbolicDelegate for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn solve(&self, request: &SymbolicRequest) -> Result<SymbolicAnswer, DelegateError> {
        Err(DelegateError::Unsupported(format!(
            "{} needs symbolic evaluation, which is not available",
            request.op.name()
        )))
    }
}
