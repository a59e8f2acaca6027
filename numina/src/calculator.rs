//! Evaluation pipeline
//!
//! text → normalize → parse → numeric evaluation, falling back to the
//! symbolic delegate for higher-order forms and equations. Every outcome,
//! including failures, comes back as an `Evaluation` with metrics.

use std::sync::Arc;
use std::time::{Duration, Instant};

use numina_core::{elapsed_ms, ErrorKind, EvaluationMetrics, EvaluationResult, MathError, MetricsRecorder, Phase};
use serde::Serialize;
use tracing::{debug, warn};

use crate::ast::{BinOp, Expr};
use crate::eval::{constant, Bindings, Evaluator, ANS};
use crate::functions::{arity_text, Builtin};
use crate::normalize::{canonical_power, normalize};
use crate::parser::{parse_statement, Parsed, Statement};
use crate::symbolic::{DelegateError, SymbolicAnswer, SymbolicDelegate, SymbolicOp, SymbolicRequest, Unavailable};

/// Default bound on one delegate call
pub const DEFAULT_DELEGATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Variable assumed when an equation or call names none
const DEFAULT_VARIABLE: &str = "x";

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Normalised expression text that was evaluated
    pub expression: String,
    pub result: EvaluationResult,
    pub metrics: EvaluationMetrics,
}

/// Routes text through the parser, evaluator and symbolic delegate.
///
/// Holds no per-request state; one instance can serve concurrent callers.
#[derive(Clone)]
pub struct Calculator {
    delegate: Arc<dyn SymbolicDelegate>,
    delegate_timeout: Duration,
}

impl Calculator {
    pub fn new(delegate: Arc<dyn SymbolicDelegate>) -> Self {
        Self { delegate, delegate_timeout: DEFAULT_DELEGATE_TIMEOUT }
    }

    /// Calculator with symbolic evaluation switched off
    pub fn numeric_only() -> Self {
        Self::new(Arc::new(Unavailable))
    }

    pub fn with_delegate_timeout(mut self, timeout: Duration) -> Self {
        self.delegate_timeout = timeout;
        self
    }

    pub fn delegate_timeout(&self) -> Duration {
        self.delegate_timeout
    }

    pub fn delegate_name(&self) -> &str {
        self.delegate.name()
    }

    /// Evaluate free text against `bindings`
    pub async fn evaluate(&self, text: &str, bindings: &Bindings) -> Evaluation {
        let mut rec = MetricsRecorder::start(text);

        let (expression, statement) = rec.time(Phase::Parse, || {
            let expression = normalize(text);
            let statement = parse_statement(&expression);
            (expression, statement)
        });

        let result = match statement {
            Err(e) => EvaluationResult::from(e),
            Ok(Statement::Expression(parsed)) => {
                observe(&mut rec, &parsed);
                self.evaluate_expression(&expression, &parsed.ast, bindings, &mut rec)
                    .await
            }
            Ok(Statement::Equation { lhs, rhs }) => {
                observe(&mut rec, &lhs);
                observe(&mut rec, &rhs);
                let difference = Expr::binary(lhs.ast, BinOp::Sub, rhs.ast);
                let op = match first_free_variable(&difference, bindings) {
                    Some(variable) => SymbolicOp::Solve { variable },
                    None => SymbolicOp::Verify,
                };
                self.delegate_call(&expression, op, difference, bindings, &mut rec)
                    .await
            }
        };

        Evaluation { expression, result, metrics: rec.finish() }
    }

    /// Explicitly request a symbolic operation on `text`
    pub async fn solve_symbolic(&self, text: &str, op: SymbolicOp, bindings: &Bindings) -> Evaluation {
        let mut rec = MetricsRecorder::start(text);
        let (expression, parsed) = rec.time(Phase::Parse, || {
            let expression = normalize(text);
            let parsed = crate::parser::parse(&expression);
            (expression, parsed)
        });

        let result = match parsed {
            Err(e) => EvaluationResult::from(e),
            Ok(parsed) => {
                observe(&mut rec, &parsed);
                self.delegate_call(&expression, op, parsed.ast, bindings, &mut rec)
                    .await
            }
        };
        Evaluation { expression, result, metrics: rec.finish() }
    }

    async fn evaluate_expression(
        &self,
        expression: &str,
        ast: &Expr,
        bindings: &Bindings,
        rec: &mut MetricsRecorder,
    ) -> EvaluationResult {
        let numeric = rec.time(Phase::Eval, || Evaluator::new().eval(ast, bindings));
        match numeric {
            Ok(v) => EvaluationResult::number(v),
            Err(e) if e.kind == ErrorKind::UnsupportedForm => {
                debug!(%expression, "routing to symbolic delegate");
                match symbolic_request(ast) {
                    Ok(request) => {
                        self.delegate_call(expression, request.op, request.expression, bindings, rec)
                            .await
                    }
                    Err(e) => EvaluationResult::from(e),
                }
            }
            Err(e) => EvaluationResult::from(e),
        }
    }

    async fn delegate_call(
        &self,
        expression: &str,
        op: SymbolicOp,
        ast: Expr,
        bindings: &Bindings,
        rec: &mut MetricsRecorder,
    ) -> EvaluationResult {
        if bindings.answer().is_none() && mentions(&ast, ANS) {
            return EvaluationResult::from(MathError::no_previous_answer());
        }
        let request = SymbolicRequest::new(op, substitute_bindings(&ast, bindings));

        let start = Instant::now();
        let answer = match tokio::time::timeout(self.delegate_timeout, self.delegate.solve(&request)).await {
            Ok(answer) => answer,
            Err(_) => Err(DelegateError::Timeout),
        };
        rec.add(Phase::DelegateCall, elapsed_ms(start));

        match answer {
            Ok(answer) => rec.time(Phase::Conversion, || into_symbolic(&request.op, answer, expression)),
            Err(e) => {
                warn!(delegate = self.delegate.name(), op = request.op.name(), error = %e, "symbolic delegate failed");
                EvaluationResult::from(MathError::from(e))
            }
        }
    }
}

fn observe(rec: &mut MetricsRecorder, parsed: &Parsed) {
    rec.observe_ast(parsed.node_count, parsed.approx_bytes);
}

fn into_symbolic(op: &SymbolicOp, answer: SymbolicAnswer, original: &str) -> EvaluationResult {
    let result = match (op, answer.verified) {
        (SymbolicOp::Verify, Some(verified)) => verified.to_string(),
        _ => canonical_power(&answer.result),
    };
    EvaluationResult::symbolic(result, answer.latex, original)
}

/// Replace bound variables (including `Ans`) with their values
fn substitute_bindings(ast: &Expr, bindings: &Bindings) -> Expr {
    ast.rewrite(&|node| {
        if let Expr::Variable(name) = &node {
            if let Some(v) = bindings.get(name) {
                return Expr::Number(v);
            }
        }
        node
    })
}

fn mentions(ast: &Expr, variable: &str) -> bool {
    let mut seen = false;
    ast.walk(&mut |node| {
        if matches!(node, Expr::Variable(name) if name == variable) {
            seen = true;
        }
    });
    seen
}

/// First variable that is neither a constant, `Ans`, nor bound
fn first_free_variable(ast: &Expr, bindings: &Bindings) -> Option<String> {
    let mut found = None;
    ast.walk(&mut |node| {
        if let Expr::Variable(name) = node {
            if found.is_none()
                && name != ANS
                && constant(name).is_none()
                && bindings.get(name).is_none()
            {
                found = Some(name.clone());
            }
        }
    });
    found
}

fn variable_arg(args: &[Expr], index: usize, func: &str) -> Result<String, MathError> {
    match args.get(index) {
        None => Ok(DEFAULT_VARIABLE.to_string()),
        Some(Expr::Variable(name)) if constant(name).is_none() => Ok(name.clone()),
        Some(other) => Err(MathError::invalid_argument(format!(
            "{}() expects a variable name, got {}",
            func, other
        ))),
    }
}

fn required_arg(args: &[Expr], index: usize, func: Builtin) -> Result<Expr, MathError> {
    let (min, max) = func.arity();
    args.get(index)
        .cloned()
        .ok_or_else(|| MathError::arg_count(func.name(), &arity_text(min, max), args.len()))
}

/// Translate a top-level higher-order call into a delegate request
fn symbolic_request(ast: &Expr) -> Result<SymbolicRequest, MathError> {
    let (name, args) = match ast {
        Expr::Call(name, args) => (name.as_str(), args.as_slice()),
        _ => {
            return Err(MathError::delegate_unsupported(
                "integrate, diff, sum and limit are only supported as the outermost call",
            ))
        }
    };
    let func = Builtin::from_name(name)
        .filter(Builtin::is_higher_order)
        .ok_or_else(|| {
            MathError::delegate_unsupported(
                "integrate, diff, sum and limit are only supported as the outermost call",
            )
        })?;

    let body = args
        .first()
        .cloned()
        .ok_or_else(|| MathError::arg_count(name, "at least 1", 0))?;
    let variable = variable_arg(args, 1, name)?;

    let op = match func {
        Builtin::Diff => {
            let order = match args.get(2) {
                None => 1,
                Some(Expr::Number(n)) if *n >= 1.0 && n.fract() == 0.0 => *n as u32,
                Some(other) => {
                    return Err(MathError::invalid_argument(format!(
                        "diff() order must be a positive integer, got {}",
                        other
                    )))
                }
            };
            SymbolicOp::Differentiate { variable, order }
        }
        Builtin::Integrate => match args.len() {
            1 | 2 => SymbolicOp::Integrate { variable, bounds: None },
            4 => SymbolicOp::Integrate {
                variable,
                bounds: Some((args[2].clone(), args[3].clone())),
            },
            n => return Err(MathError::arg_count(name, "1, 2 or 4", n)),
        },
        Builtin::Sum => SymbolicOp::Sum {
            variable,
            lower: required_arg(args, 2, func)?,
            upper: required_arg(args, 3, func)?,
        },
        Builtin::Limit => SymbolicOp::Limit { variable, point: required_arg(args, 2, func)? },
        _ => return Err(MathError::unsupported_form(name)),
    };
    Ok(SymbolicRequest::new(op, body))
}

// ============================================================================
// Session
// ============================================================================

/// Interactive session: a calculator plus the previous answer.
///
/// Only numeric results update `Ans`; errors and symbolic results leave it
/// unchanged.
pub struct Session {
    calculator: Calculator,
    bindings: Bindings,
}

impl Session {
    pub fn new(calculator: Calculator) -> Self {
        Self { calculator, bindings: Bindings::new() }
    }

    pub async fn evaluate(&mut self, text: &str) -> Evaluation {
        let evaluation = self.calculator.evaluate(text, &self.bindings).await;
        if let Some(v) = evaluation.result.as_number() {
            self.bindings.set_answer(v);
        }
        evaluation
    }

    pub fn previous_answer(&self) -> Option<f64> {
        self.bindings.answer()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }
}
