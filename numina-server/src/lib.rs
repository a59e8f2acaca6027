//! Numina Server - Local evaluation service
//!
//! One endpoint: `POST /` with `{"text": "..."}`. Every request runs its
//! own parse/evaluate pipeline; nothing carries over between requests.
//!
//! Replies are always HTTP 200 with one of the shapes below, including
//! for bodies over the size limit:
//! - `{"success": true, "expression": "...", "result": 4}`
//! - `{"success": false, "error": "..."}`

pub mod config;
pub mod repl;

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::post;
use axum::{Json, Router};
use numina::{Bindings, Calculator, Evaluation, EvaluationResult, Formatter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Largest magnitude reported as a JSON integer
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Characters of request text echoed into the log line
const LOG_PREVIEW_CHARS: usize = 60;

/// Default cap on a request body
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Shared, read-only service state
pub struct AppState {
    calculator: Calculator,
    body_limit: usize,
}

impl AppState {
    pub fn new(calculator: Calculator) -> Self {
        Self { calculator, body_limit: DEFAULT_BODY_LIMIT }
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }
}

#[derive(Debug, Deserialize)]
struct SolveRequest {
    text: String,
}

/// Reply body of `POST /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SolveResponse {
    pub fn success(expression: impl Into<String>, result: Value) -> Self {
        Self {
            success: true,
            expression: Some(expression.into()),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            expression: None,
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        match &evaluation.result {
            EvaluationResult::Number { value } => {
                Self::success(&evaluation.expression, number_value(*value))
            }
            EvaluationResult::Symbolic { result, .. } => {
                Self::success(&evaluation.expression, Value::String(result.clone()))
            }
            EvaluationResult::Error { message } => Self::failure(message.as_str()),
            not_implemented => Self::failure(Formatter::new().format_result(not_implemented)),
        }
    }
}

/// Integral values become JSON integers, other finite values JSON floats;
/// JSON has no NaN or infinity, so those are sent as display text.
fn number_value(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        return Value::from(value as i64);
    }
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(Formatter::new().format_number(value)))
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    if text.chars().count() > LOG_PREVIEW_CHARS {
        out.push('…');
    }
    out
}

async fn solve(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Json<SolveResponse> {
    let start = Instant::now();

    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!("POST / rejected in {:.2?}: {}", start.elapsed(), e.body_text());
            return Json(SolveResponse::failure(format!("Invalid request: {}", e.body_text())));
        }
    };

    let request: SolveRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("POST / rejected in {:.2?}: malformed body: {}", start.elapsed(), e);
            return Json(SolveResponse::failure(format!("Invalid request: {}", e)));
        }
    };

    let evaluation = state.calculator.evaluate(&request.text, &Bindings::new()).await;
    let response = SolveResponse::from_evaluation(&evaluation);

    info!(
        text = %preview(&request.text),
        outcome = evaluation.result.type_name(),
        "POST / in {:.2?}",
        start.elapsed()
    );
    Json(response)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(solve))
        .layer(DefaultBodyLimit::max(state.body_limit))
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until the listener fails
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(
        %addr,
        delegate = state.calculator.delegate_name(),
        body_limit = state.body_limit,
        "numina evaluation service listening"
    );
    axum::serve(listener, build_router(state)).await
}
