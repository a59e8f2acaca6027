//! Abstract Syntax Tree
//!
//! Nodes own their children; there is no sharing and no back-reference.
//! `Display` prints with the fewest parentheses that still reparse to the
//! same tree.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),
    Variable(String),
    BinaryOp(Box<Expr>, BinOp, Box<Expr>),
    UnaryOp(UnaryOp, Box<Expr>),
    /// Function call: name and arguments
    Call(String, Vec<Expr>),
    /// List literal: [a, b, c]
    List(Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp { Add, Sub, Mul, Div, Pow }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    /// Postfix `!`
    Factorial,
}

// Binding strength used by the printer
const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_NEG: u8 = 3;
const PREC_POW: u8 = 4;
const PREC_POSTFIX: u8 = 5;
const PREC_ATOM: u8 = 6;

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => PREC_ADD,
            BinOp::Mul | BinOp::Div => PREC_MUL,
            BinOp::Pow => PREC_POW,
        }
    }
}

impl Expr {
    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::BinaryOp(Box::new(left), op, Box::new(right))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::UnaryOp(op, Box::new(operand))
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Number(_) | Expr::Variable(_) => 1,
            Expr::BinaryOp(l, _, r) => 1 + l.node_count() + r.node_count(),
            Expr::UnaryOp(_, inner) => 1 + inner.node_count(),
            Expr::Call(_, args) | Expr::List(args) => {
                1 + args.iter().map(Expr::node_count).sum::<usize>()
            }
        }
    }

    /// Visit every node, parents before children
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        match self {
            Expr::Number(_) | Expr::Variable(_) => {}
            Expr::BinaryOp(l, _, r) => {
                l.walk(f);
                r.walk(f);
            }
            Expr::UnaryOp(_, inner) => inner.walk(f),
            Expr::Call(_, args) | Expr::List(args) => {
                for a in args {
                    a.walk(f);
                }
            }
        }
    }

    /// Rebuild the tree bottom-up, letting `f` replace any node
    pub fn rewrite(&self, f: &impl Fn(Expr) -> Expr) -> Expr {
        let rebuilt = match self {
            Expr::Number(_) | Expr::Variable(_) => self.clone(),
            Expr::BinaryOp(l, op, r) => Expr::binary(l.rewrite(f), *op, r.rewrite(f)),
            Expr::UnaryOp(op, inner) => Expr::unary(*op, inner.rewrite(f)),
            Expr::Call(name, args) => {
                Expr::Call(name.clone(), args.iter().map(|a| a.rewrite(f)).collect())
            }
            Expr::List(items) => Expr::List(items.iter().map(|a| a.rewrite(f)).collect()),
        };
        f(rebuilt)
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::BinaryOp(_, op, _) => op.precedence(),
            Expr::UnaryOp(UnaryOp::Neg, _) => PREC_NEG,
            Expr::UnaryOp(UnaryOp::Factorial, _) => PREC_POSTFIX,
            Expr::Number(n) if n.is_sign_negative() => PREC_NEG,
            _ => PREC_ATOM,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        if self.precedence() < min_prec {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::BinaryOp(l, BinOp::Pow, r) => {
                // Right-associative: the base must be postfix-tight, the
                // exponent may carry a unary minus
                l.fmt_child(f, PREC_POSTFIX)?;
                write!(f, "^")?;
                r.fmt_child(f, PREC_NEG)
            }
            Expr::BinaryOp(l, op, r) => {
                let p = op.precedence();
                l.fmt_child(f, p)?;
                write!(f, " {} ", op.symbol())?;
                r.fmt_child(f, p + 1)
            }
            Expr::UnaryOp(UnaryOp::Neg, inner) => {
                write!(f, "-")?;
                inner.fmt_child(f, PREC_NEG)
            }
            Expr::UnaryOp(UnaryOp::Factorial, inner) => {
                inner.fmt_child(f, PREC_POSTFIX)?;
                write!(f, "!")
            }
            Expr::Call(name, args) => {
                write!(f, "{}(", name)?;
                fmt_list(f, args)?;
                write!(f, ")")
            }
            Expr::List(items) => {
                write!(f, "[")?;
                fmt_list(f, items)?;
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    fn var(name: &str) -> Expr {
        Expr::Variable(name.to_string())
    }

    #[test]
    fn test_node_count() {
        // sin(x) * 2
        let e = Expr::binary(Expr::Call("sin".into(), vec![var("x")]), BinOp::Mul, num(2.0));
        assert_eq!(e.node_count(), 4);
    }

    #[test]
    fn test_display_minimal_parens() {
        let sum = Expr::binary(num(1.0), BinOp::Add, num(2.0));
        assert_eq!(Expr::binary(sum.clone(), BinOp::Mul, num(3.0)).to_string(), "(1 + 2) * 3");
        assert_eq!(Expr::binary(num(3.0), BinOp::Sub, sum.clone()).to_string(), "3 - (1 + 2)");
        assert_eq!(Expr::binary(sum, BinOp::Sub, num(3.0)).to_string(), "1 + 2 - 3");
    }

    #[test]
    fn test_display_power() {
        let right = Expr::binary(num(2.0), BinOp::Pow, Expr::binary(num(3.0), BinOp::Pow, num(2.0)));
        assert_eq!(right.to_string(), "2^3^2");
        let left = Expr::binary(Expr::binary(num(2.0), BinOp::Pow, num(3.0)), BinOp::Pow, num(2.0));
        assert_eq!(left.to_string(), "(2^3)^2");
        let neg_exp = Expr::binary(var("x"), BinOp::Pow, Expr::unary(UnaryOp::Neg, num(1.0)));
        assert_eq!(neg_exp.to_string(), "x^-1");
        let neg_base = Expr::binary(Expr::unary(UnaryOp::Neg, var("x")), BinOp::Pow, num(2.0));
        assert_eq!(neg_base.to_string(), "(-x)^2");
    }

    #[test]
    fn test_display_unary() {
        let e = Expr::unary(UnaryOp::Neg, Expr::binary(var("x"), BinOp::Pow, num(2.0)));
        assert_eq!(e.to_string(), "-x^2");
        let f = Expr::unary(UnaryOp::Factorial, Expr::binary(num(2.0), BinOp::Add, num(1.0)));
        assert_eq!(f.to_string(), "(2 + 1)!");
    }

    #[test]
    fn test_display_call_and_list() {
        let e = Expr::Call(
            "det".into(),
            vec![Expr::List(vec![
                Expr::List(vec![num(1.0), num(2.0)]),
                Expr::List(vec![num(3.0), num(4.5)]),
            ])],
        );
        assert_eq!(e.to_string(), "det([[1, 2], [3, 4.5]])");
    }

    #[test]
    fn test_rewrite() {
        let e = Expr::binary(var("x"), BinOp::Add, var("y"));
        let out = e.rewrite(&|node| match node {
            Expr::Variable(ref n) if n == "x" => num(1.0),
            other => other,
        });
        assert_eq!(out, Expr::binary(num(1.0), BinOp::Add, var("y")));
    }
}
