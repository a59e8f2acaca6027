//! Expression parser
//!
//! Tokenizer followed by recursive descent. Grammar, loosest first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | power
//! power   := postfix ('^' unary)?
//! postfix := primary '!'*
//! primary := number | ident | ident '(' args ')' | '(' expr ')' | '[' args ']'
//! ```
//!
//! `^` is right-associative and binds tighter than unary minus, so `-2^2`
//! is `-(2^2)` while `2^-1` is allowed. Error positions are character
//! offsets into the input. Nesting and tree height are capped so that no
//! input can exhaust the stack here or in later tree walks.

use std::mem::size_of;
use std::time::Instant;

use numina_core::{elapsed_ms, MathError};
use crate::ast::{BinOp, Expr, UnaryOp};
use crate::functions::Builtin;

/// Output of a successful parse
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub ast: Expr,
    pub node_count: usize,
    pub token_count: usize,
    /// Rough size of the token buffer plus the tree
    pub approx_bytes: usize,
    pub parse_time_ms: f64,
}

/// A plain expression, or an equation with one top-level `=`
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Parsed),
    Equation { lhs: Parsed, rhs: Parsed },
}

/// Parse an expression string
pub fn parse(input: &str) -> Result<Parsed, MathError> {
    parse_at(input, 0)
}

/// Parse and keep only the tree
pub fn parse_expr(input: &str) -> Result<Expr, MathError> {
    parse(input).map(|p| p.ast)
}

/// Parse an expression or a single-`=` equation
pub fn parse_statement(input: &str) -> Result<Statement, MathError> {
    let eq_count = input.matches('=').count();
    if eq_count != 1 {
        // Zero is a plain expression; more than one fails on the second '='
        return parse(input).map(Statement::Expression);
    }

    let (byte_idx, _) = input
        .char_indices()
        .find(|(_, c)| *c == '=')
        .unwrap_or((0, '='));
    let char_idx = input[..byte_idx].chars().count();
    let (left, right) = (&input[..byte_idx], &input[byte_idx + 1..]);

    if left.trim().is_empty() {
        return Err(MathError::parse_error(char_idx, "missing left side of equation"));
    }
    if right.trim().is_empty() {
        return Err(MathError::parse_error(char_idx, "missing right side of equation"));
    }

    let lhs = parse_at(left, 0)?;
    let rhs = parse_at(right, char_idx + 1)?;
    Ok(Statement::Equation { lhs, rhs })
}

fn parse_at(input: &str, offset: usize) -> Result<Parsed, MathError> {
    let start = Instant::now();
    let tokens = tokenize(input, offset)?;
    let token_count = tokens.len().saturating_sub(1);

    let mut parser = Parser::new(tokens);
    if parser.peek() == &Tok::End {
        return Err(MathError::parse_error(parser.peek_pos(), "empty expression"));
    }
    let (ast, _) = parser.parse_expr()?;
    parser.expect_end()?;

    let node_count = ast.node_count();
    let approx_bytes =
        parser.tokens.len() * size_of::<Token>() + node_count * size_of::<Expr>();

    Ok(Parsed {
        ast,
        node_count,
        token_count,
        approx_bytes,
        parse_time_ms: elapsed_ms(start),
    })
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Bang,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    End,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Num(n) => format!("number {}", n),
            Tok::Ident(name) => format!("'{}'", name),
            Tok::Plus => "'+'".into(),
            Tok::Minus => "'-'".into(),
            Tok::Star => "'*'".into(),
            Tok::Slash => "'/'".into(),
            Tok::Caret => "'^'".into(),
            Tok::Bang => "'!'".into(),
            Tok::LParen => "'('".into(),
            Tok::RParen => "')'".into(),
            Tok::LBracket => "'['".into(),
            Tok::RBracket => "']'".into(),
            Tok::Comma => "','".into(),
            Tok::End => "end of input".into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    pos: usize,
}

fn tokenize(input: &str, offset: usize) -> Result<Vec<Token>, MathError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let pos = offset + i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            // Exponent only when digits follow, so `2e` stays 2 then e
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value: f64 = text
                .parse()
                .map_err(|_| MathError::parse_error(pos, format!("invalid number '{}'", text)))?;
            if !value.is_finite() {
                return Err(MathError::parse_error(pos, format!("number '{}' is out of range", text)));
            }
            tokens.push(Token { tok: Tok::Num(value), pos });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            tokens.push(Token { tok: Tok::Ident(name), pos });
            continue;
        }

        let tok = match c {
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            '*' => Tok::Star,
            '/' => Tok::Slash,
            '^' => Tok::Caret,
            '!' => Tok::Bang,
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            '[' => Tok::LBracket,
            ']' => Tok::RBracket,
            ',' => Tok::Comma,
            other => {
                return Err(MathError::parse_error(
                    pos,
                    format!("unexpected character '{}'", other),
                ))
            }
        };
        tokens.push(Token { tok, pos });
        i += 1;
    }

    tokens.push(Token { tok: Tok::End, pos: offset + chars.len() });
    Ok(tokens)
}

// ============================================================================
// Recursive descent
// ============================================================================

/// Deepest bracket or unary-minus nesting the descent will follow
const MAX_NESTING: usize = 256;

/// Tallest tree the parser will build; long operator chains count too
const MAX_HEIGHT: usize = 512;

/// Parsed subtree with its height
type Node = (Expr, usize);

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> &Tok {
        self.tokens.get(self.pos).map(|t| &t.tok).unwrap_or(&Tok::End)
    }

    fn peek_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.pos)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens.get(self.pos).cloned().unwrap_or(Token {
            tok: Tok::End,
            pos: self.peek_pos(),
        });
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self) -> MathError {
        let tok = self.peek();
        let reason = match tok {
            Tok::End => "unexpected end of input".to_string(),
            other => format!("unexpected {}", other.describe()),
        };
        MathError::parse_error(self.peek_pos(), reason)
    }

    fn too_deep(&self) -> MathError {
        MathError::parse_error(self.peek_pos(), "expression nested too deeply")
    }

    /// Wrap `expr` whose tallest child has height `child_height`
    fn grow(&self, expr: Expr, child_height: usize) -> Result<Node, MathError> {
        let height = child_height + 1;
        if height > MAX_HEIGHT {
            return Err(self.too_deep());
        }
        Ok((expr, height))
    }

    fn expect_end(&self) -> Result<(), MathError> {
        match self.peek() {
            Tok::End => Ok(()),
            _ => Err(self.unexpected()),
        }
    }

    /// Consume the closing delimiter of a group opened at `open_pos`
    fn expect_close(&mut self, close: Tok, open: char, open_pos: usize) -> Result<(), MathError> {
        if *self.peek() == close {
            self.advance();
            Ok(())
        } else if *self.peek() == Tok::End {
            Err(MathError::parse_error(open_pos, format!("unclosed '{}'", open)))
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_expr(&mut self) -> Result<Node, MathError> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Node, MathError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Tok::Plus => BinOp::Add,
                Tok::Minus => BinOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.grow(Expr::binary(left.0, op, right.0), left.1.max(right.1))?;
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Node, MathError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Tok::Star => BinOp::Mul,
                Tok::Slash => BinOp::Div,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.grow(Expr::binary(left.0, op, right.0), left.1.max(right.1))?;
        }
    }

    /// Every recursive path of the grammar passes through here
    fn parse_unary(&mut self) -> Result<Node, MathError> {
        if self.depth >= MAX_NESTING {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = if *self.peek() == Tok::Minus {
            self.advance();
            self.parse_unary()
                .and_then(|(operand, h)| self.grow(Expr::unary(UnaryOp::Neg, operand), h))
        } else {
            self.parse_power()
        };
        self.depth -= 1;
        result
    }

    fn parse_power(&mut self) -> Result<Node, MathError> {
        let base = self.parse_postfix()?;
        if *self.peek() == Tok::Caret {
            self.advance();
            let exponent = self.parse_unary()?;
            return self.grow(Expr::binary(base.0, BinOp::Pow, exponent.0), base.1.max(exponent.1));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Node, MathError> {
        let mut node = self.parse_primary()?;
        while *self.peek() == Tok::Bang {
            self.advance();
            node = self.grow(Expr::unary(UnaryOp::Factorial, node.0), node.1)?;
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<Node, MathError> {
        let pos = self.peek_pos();
        match self.peek().clone() {
            Tok::Num(n) => {
                self.advance();
                Ok((Expr::Number(n), 1))
            }
            Tok::Ident(name) => {
                self.advance();
                if *self.peek() == Tok::LParen {
                    if Builtin::from_name(&name).is_none() {
                        return Err(MathError::parse_error(
                            pos,
                            format!("unknown function '{}'", name),
                        ));
                    }
                    let open_pos = self.peek_pos();
                    self.advance();
                    let (args, h) = self.parse_args(Tok::RParen, '(', open_pos)?;
                    self.grow(Expr::Call(name, args), h)
                } else if Builtin::from_name(&name).is_some() {
                    Err(MathError::parse_error(
                        pos,
                        format!("function '{}' needs an argument list", name),
                    ))
                } else {
                    Ok((Expr::Variable(name), 1))
                }
            }
            Tok::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_close(Tok::RParen, '(', pos)?;
                Ok(inner)
            }
            Tok::LBracket => {
                self.advance();
                let (items, h) = self.parse_args(Tok::RBracket, '[', pos)?;
                self.grow(Expr::List(items), h)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Comma-separated expressions up to `close`, with the tallest one's
    /// height; the opener is consumed
    fn parse_args(
        &mut self,
        close: Tok,
        open: char,
        open_pos: usize,
    ) -> Result<(Vec<Expr>, usize), MathError> {
        let mut args = Vec::new();
        let mut height = 0;
        if *self.peek() == close {
            self.advance();
            return Ok((args, height));
        }
        loop {
            let (arg, h) = self.parse_expr()?;
            args.push(arg);
            height = height.max(h);
            if *self.peek() == Tok::Comma {
                self.advance();
                continue;
            }
            self.expect_close(close, open, open_pos)?;
            return Ok((args, height));
        }
    }
}
