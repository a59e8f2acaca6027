//! Numina - Expression engine
//!
//! Parses free-form math text, evaluates it numerically, and hands
//! closed-form work to a symbolic delegate. Also samples expressions for
//! plotting and formats results for display.
//!
//! ```ignore
//! let calc = Calculator::numeric_only();
//! let ev = calc.evaluate("2 + 3 * 4", &Bindings::new()).await;
//! assert_eq!(ev.result.as_number(), Some(14.0));
//! ```

mod ast;
mod calculator;
mod eval;
mod format;
mod functions;
mod graph;
mod normalize;
mod parser;
pub mod symbolic;

pub use ast::{BinOp, Expr, UnaryOp};
pub use calculator::{Calculator, Evaluation, Session, DEFAULT_DELEGATE_TIMEOUT};
pub use eval::{Bindings, Evaluator, ANS};
pub use format::Formatter;
pub use functions::Builtin;
pub use graph::{sample, sample_multiple, SamplePoint, Series, SeriesStatus, MAX_POINTS, SAMPLE_VARIABLE};
pub use normalize::normalize;
pub use parser::{parse, parse_expr, parse_statement, Parsed, Statement};
pub use symbolic::{
    DelegateError, SymbolicAnswer, SymbolicDelegate, SymbolicOp, SymbolicRequest, SympyDelegate,
    Unavailable,
};

pub use numina_core::{
    ErrorKind, EvaluationMetrics, EvaluationResult, KernelMetrics, MathError, TimedResult,
};
