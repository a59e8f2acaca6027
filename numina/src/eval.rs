//! Numeric evaluator
//!
//! Walks an AST in IEEE-754 double precision. NaN and infinities propagate;
//! only the documented domain violations are errors. Trigonometric
//! arguments are radians.

use std::collections::HashMap;
use std::f64::consts::{E, PI};

use numina_core::MathError;
use numina_matrix::Matrix;
use crate::ast::{BinOp, Expr, UnaryOp};
use crate::functions::{arity_text, Builtin};

/// Name of the previous-answer binding
pub const ANS: &str = "Ans";

/// Largest n for which n! is finite in f64
const MAX_FACTORIAL: u32 = 170;

/// Variable bindings for one evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    vars: HashMap<String, f64>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(answer: f64) -> Self {
        let mut b = Self::new();
        b.set_answer(answer);
        b
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.vars.insert(name.into(), value);
    }

    pub fn set_answer(&mut self, value: f64) {
        self.set(ANS, value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.vars.get(name).copied()
    }

    pub fn answer(&self) -> Option<f64> {
        self.get(ANS)
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }
}

/// Value of a named constant, if `name` is one
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(PI),
        "e" => Some(E),
        _ => None,
    }
}

/// Stateless AST evaluator
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `expr` to a double
    pub fn eval(&self, expr: &Expr, bindings: &Bindings) -> Result<f64, MathError> {
        match expr {
            Expr::Number(n) => Ok(*n),

            Expr::Variable(name) => self.lookup(name, bindings),

            Expr::BinaryOp(left, op, right) => {
                let l = self.eval(left, bindings)?;
                let r = self.eval(right, bindings)?;
                self.eval_binary_op(l, *op, r)
            }

            Expr::UnaryOp(op, inner) => {
                let v = self.eval(inner, bindings)?;
                self.eval_unary_op(*op, v)
            }

            Expr::Call(name, args) => self.eval_call(name, args, bindings),

            Expr::List(_) => Err(MathError::invalid_argument(
                "A list cannot be used where a number is expected",
            )
            .with_suggestion("Pass lists to det, dot, norm, mean, median, stddev or corr")),
        }
    }

    fn lookup(&self, name: &str, bindings: &Bindings) -> Result<f64, MathError> {
        if let Some(c) = constant(name) {
            return Ok(c);
        }
        match bindings.get(name) {
            Some(v) => Ok(v),
            None if name == ANS => Err(MathError::no_previous_answer()),
            None => Err(MathError::undefined_var(name)),
        }
    }

    fn eval_binary_op(&self, l: f64, op: BinOp, r: f64) -> Result<f64, MathError> {
        match op {
            BinOp::Add => Ok(l + r),
            BinOp::Sub => Ok(l - r),
            BinOp::Mul => Ok(l * r),
            BinOp::Div => {
                if r == 0.0 {
                    return Err(MathError::div_zero().with_suggestion("Ensure divisor is not zero"));
                }
                Ok(l / r)
            }
            BinOp::Pow => Ok(l.powf(r)),
        }
    }

    fn eval_unary_op(&self, op: UnaryOp, v: f64) -> Result<f64, MathError> {
        match op {
            UnaryOp::Neg => Ok(-v),
            UnaryOp::Factorial => factorial(v),
        }
    }

    fn eval_call(&self, name: &str, args: &[Expr], bindings: &Bindings) -> Result<f64, MathError> {
        let func = Builtin::from_name(name)
            .ok_or_else(|| MathError::invalid_argument(format!("Unknown function: {}", name)))?;

        let (min, max) = func.arity();
        if args.len() < min || args.len() > max {
            return Err(MathError::arg_count(name, &arity_text(min, max), args.len()));
        }

        if func.is_higher_order() {
            return Err(MathError::unsupported_form(name));
        }
        if func.is_array() {
            return self.eval_array_call(func, args, bindings);
        }

        let x = self.eval(&args[0], bindings)?;
        match func {
            Builtin::Sin => Ok(x.sin()),
            Builtin::Cos => Ok(x.cos()),
            Builtin::Tan => Ok(x.tan()),
            Builtin::Asin => {
                check_unit_interval(x, "asin")?;
                Ok(x.asin())
            }
            Builtin::Acos => {
                check_unit_interval(x, "acos")?;
                Ok(x.acos())
            }
            Builtin::Atan => Ok(x.atan()),
            Builtin::Sinh => Ok(x.sinh()),
            Builtin::Cosh => Ok(x.cosh()),
            Builtin::Tanh => Ok(x.tanh()),
            Builtin::Ln => {
                check_non_negative(x, "ln")?;
                Ok(x.ln())
            }
            Builtin::Log => {
                check_non_negative(x, "log")?;
                if args.len() == 2 {
                    let base = self.eval(&args[1], bindings)?;
                    if base <= 0.0 || base == 1.0 {
                        return Err(MathError::domain_error(format!(
                            "log() base must be positive and not 1, got {}",
                            base
                        )));
                    }
                    Ok(x.ln() / base.ln())
                } else {
                    Ok(x.log10())
                }
            }
            Builtin::Sqrt => {
                check_non_negative(x, "sqrt")?;
                Ok(x.sqrt())
            }
            Builtin::Abs => Ok(x.abs()),
            Builtin::Exp => Ok(x.exp()),
            _ => Err(MathError::unsupported_form(name)),
        }
    }

    // ========== Array functions ==========

    fn eval_array_call(&self, func: Builtin, args: &[Expr], bindings: &Bindings) -> Result<f64, MathError> {
        let name = func.name();
        let value = match func {
            Builtin::Det => {
                let m = self.eval_matrix(&args[0], name, bindings)?;
                numina_matrix::determinant(&m)?.value
            }
            Builtin::Dot => {
                let u = self.eval_vector(&args[0], name, bindings)?;
                let v = self.eval_vector(&args[1], name, bindings)?;
                numina_matrix::dot(&u, &v)?.value
            }
            Builtin::Norm => {
                let v = self.eval_vector(&args[0], name, bindings)?;
                numina_matrix::norm(&v)?.value
            }
            Builtin::Mean => numina_stats::mean(&self.eval_vector(&args[0], name, bindings)?)?.value,
            Builtin::Median => numina_stats::median(&self.eval_vector(&args[0], name, bindings)?)?.value,
            Builtin::Stddev => {
                numina_stats::standard_deviation(&self.eval_vector(&args[0], name, bindings)?)?.value
            }
            Builtin::Corr => {
                let x = self.eval_vector(&args[0], name, bindings)?;
                let y = self.eval_vector(&args[1], name, bindings)?;
                numina_stats::correlation(&x, &y)?.value
            }
            _ => return Err(MathError::unsupported_form(name)),
        };
        Ok(value)
    }

    fn eval_vector(&self, expr: &Expr, func: &str, bindings: &Bindings) -> Result<Vec<f64>, MathError> {
        match expr {
            Expr::List(items) => items.iter().map(|e| self.eval(e, bindings)).collect(),
            _ => Err(MathError::invalid_argument(format!(
                "{}() expects a list such as [1, 2, 3]",
                func
            ))),
        }
    }

    fn eval_matrix(&self, expr: &Expr, func: &str, bindings: &Bindings) -> Result<Matrix, MathError> {
        let rows = match expr {
            Expr::List(rows) if rows.iter().all(|r| matches!(r, Expr::List(_))) => rows,
            _ => {
                return Err(MathError::invalid_argument(format!(
                    "{}() expects a matrix such as [[1, 2], [3, 4]]",
                    func
                )))
            }
        };
        let rows = rows
            .iter()
            .map(|r| self.eval_vector(r, func, bindings))
            .collect::<Result<Vec<_>, _>>()?;
        Matrix::from_rows(rows)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

// NaN fails every comparison below, so it propagates instead of erroring

fn check_unit_interval(x: f64, func: &str) -> Result<(), MathError> {
    if x < -1.0 || x > 1.0 {
        return Err(MathError::domain_error(format!(
            "{}() requires an argument in [-1, 1], got {}",
            func, x
        )));
    }
    Ok(())
}

fn check_non_negative(x: f64, func: &str) -> Result<(), MathError> {
    if x < 0.0 {
        return Err(MathError::domain_error(format!(
            "{}() of a negative number, got {}",
            func, x
        )));
    }
    Ok(())
}

fn factorial(n: f64) -> Result<f64, MathError> {
    if n.is_nan() {
        return Ok(n);
    }
    if n < 0.0 || n.fract() != 0.0 {
        return Err(MathError::domain_error(format!(
            "factorial requires a non-negative integer, got {}",
            n
        )));
    }
    if n > MAX_FACTORIAL as f64 {
        return Ok(f64::INFINITY);
    }
    Ok((2..=n as u32).fold(1.0, |acc, k| acc * k as f64))
}
