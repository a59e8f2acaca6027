//! SymPy sidecar client
//!
//! Speaks the sidecar's HTTP contract:
//!
//! - `GET /health` → `{"status": "online", "service": "sympy"}`
//! - `POST /<operation>` with `{"expression", "variable"?}` →
//!   `{"result", "latex", "execution_time_ms"[, "verified"]}`,
//!   or `{"error"}` with a 4xx/5xx status.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{DelegateError, SymbolicAnswer, SymbolicDelegate, SymbolicOp, SymbolicRequest};
use crate::ast::Expr;

#[derive(Serialize)]
struct SympyRequest<'a> {
    expression: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variable: Option<&'a str>,
}

#[derive(Deserialize)]
struct SympyReply {
    result: Option<String>,
    latex: Option<String>,
    execution_time_ms: Option<f64>,
    verified: Option<bool>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct HealthReply {
    status: String,
}

/// HTTP client for the SymPy sidecar
#[derive(Debug, Clone)]
pub struct SympyDelegate {
    client: reqwest::Client,
    base_url: String,
}

impl SympyDelegate {
    pub const DEFAULT_URL: &'static str = "http://127.0.0.1:8001";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when the sidecar reports itself online
    pub async fn health(&self) -> Result<bool, DelegateError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Ok(false);
        }
        let reply: HealthReply = resp
            .json()
            .await
            .map_err(|e| DelegateError::Backend(format!("malformed health reply: {}", e)))?;
        Ok(reply.status == "online")
    }
}

/// Endpoint for an operation; the sidecar has no summation, limit,
/// definite-integral or higher-order-derivative routes.
fn endpoint(op: &SymbolicOp) -> Result<&'static str, DelegateError> {
    match op {
        SymbolicOp::Differentiate { order, .. } if *order != 1 => Err(DelegateError::Unsupported(
            "Higher-order derivatives are not supported by the SymPy backend".into(),
        )),
        SymbolicOp::Integrate { bounds: Some(_), .. } => Err(DelegateError::Unsupported(
            "Definite integrals are not supported by the SymPy backend".into(),
        )),
        SymbolicOp::Sum { .. } | SymbolicOp::Limit { .. } => Err(DelegateError::Unsupported(
            format!("{}() is not supported by the SymPy backend", op.name()),
        )),
        other => Ok(other.name()),
    }
}

/// Render an expression in the syntax the sidecar parses.
///
/// Euler's number is `E` there, and a bare `log` is natural, so base-10
/// `log(u)` is sent as `log(u, 10)`.
pub fn to_sympy_syntax(expr: &Expr) -> String {
    expr.rewrite(&|node| match node {
        Expr::Variable(name) if name == "e" => Expr::Variable("E".into()),
        Expr::Call(name, mut args) if name == "log" && args.len() == 1 => {
            args.push(Expr::Number(10.0));
            Expr::Call(name, args)
        }
        other => other,
    })
    .to_string()
}

#[async_trait]
impl SymbolicDelegate for SympyDelegate {
    fn name(&self) -> &str {
        "sympy"
    }

    async fn solve(&self, request: &SymbolicRequest) -> Result<SymbolicAnswer, DelegateError> {
        let path = endpoint(&request.op)?;
        let expression = to_sympy_syntax(&request.expression);
        let body = SympyRequest {
            expression: &expression,
            variable: request.op.variable(),
        };

        tracing::debug!(endpoint = path, %expression, "calling sympy sidecar");
        let resp = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let reply: Option<SympyReply> = resp.json().await.ok();

        if !status.is_success() {
            let message = reply
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("symbolic backend returned {}", status));
            return Err(DelegateError::Backend(message));
        }

        let reply = reply.ok_or_else(|| DelegateError::Backend("malformed symbolic reply".into()))?;
        if let Some(error) = reply.error {
            return Err(DelegateError::Backend(error));
        }
        let result = reply
            .result
            .ok_or_else(|| DelegateError::Backend("symbolic reply has no result".into()))?;

        Ok(SymbolicAnswer {
            latex: reply.latex.unwrap_or_else(|| result.clone()),
            result,
            verified: reply.verified,
            backend_time_ms: reply.execution_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    #[test]
    fn test_sympy_syntax() {
        assert_eq!(to_sympy_syntax(&parse_expr("e^x + log(x)").unwrap()), "E^x + log(x, 10)");
        assert_eq!(to_sympy_syntax(&parse_expr("log(x, 2)").unwrap()), "log(x, 2)");
        assert_eq!(to_sympy_syntax(&parse_expr("ln(x)*pi").unwrap()), "ln(x) * pi");
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(endpoint(&SymbolicOp::Simplify).unwrap(), "simplify");
        assert_eq!(
            endpoint(&SymbolicOp::Differentiate { variable: "x".into(), order: 1 }).unwrap(),
            "differentiate"
        );
        assert!(matches!(
            endpoint(&SymbolicOp::Differentiate { variable: "x".into(), order: 2 }),
            Err(DelegateError::Unsupported(_))
        ));
        assert!(matches!(
            endpoint(&SymbolicOp::Limit { variable: "x".into(), point: Expr::Number(0.0) }),
            Err(DelegateError::Unsupported(_))
        ));
        assert!(matches!(
            endpoint(&SymbolicOp::Integrate {
                variable: "x".into(),
                bounds: Some((Expr::Number(0.0), Expr::Number(1.0)))
            }),
            Err(DelegateError::Unsupported(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        assert_eq!(SympyDelegate::new("http://localhost:8001/").base_url(), "http://localhost:8001");
    }
}
