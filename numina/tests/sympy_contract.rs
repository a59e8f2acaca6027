//! Contract tests for the SymPy sidecar client
//!
//! A stub sidecar speaks the same HTTP contract on an ephemeral port:
//! - `GET /health` reports online
//! - operation endpoints echo canned answers and record request bodies
//! - `/evaluate` always fails with a JSON error body

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use numina::{
    Bindings, Calculator, ErrorKind, EvaluationResult, SymbolicDelegate, SymbolicOp,
    SymbolicRequest, SympyDelegate,
};
use serde_json::{json, Value};
use tokio::time::timeout;

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

fn record(seen: &Seen, endpoint: &str, body: &Value) {
    seen.lock().unwrap().push((endpoint.to_string(), body.clone()));
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "online", "service": "sympy" }))
}

async fn differentiate(State(seen): State<Seen>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    record(&seen, "differentiate", &body);
    if body["variable"] != "x" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Variable is required" })));
    }
    (StatusCode::OK, Json(json!({ "result": "2*x", "latex": "2 x", "execution_time_ms": 1.5 })))
}

async fn integrate(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    record(&seen, "integrate", &body);
    Json(json!({ "result": "x**3/3", "latex": "\\frac{x^{3}}{3}", "execution_time_ms": 2.0 }))
}

async fn solve(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    record(&seen, "solve", &body);
    Json(json!({ "result": "[-2, 2]", "latex": "\\left[ -2, \\  2\\right]", "execution_time_ms": 3.0 }))
}

async fn verify(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    record(&seen, "verify", &body);
    Json(json!({ "result": "0", "latex": "0", "verified": true, "execution_time_ms": 0.5 }))
}

async fn simplify(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    record(&seen, "simplify", &body);
    Json(json!({ "result": "2*x", "latex": "2 x", "execution_time_ms": 0.7 }))
}

async fn evaluate(State(seen): State<Seen>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    record(&seen, "evaluate", &body);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Invalid expression" })))
}

/// Start the stub sidecar; returns its base URL and the request log
async fn start_stub() -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/health", get(health))
        .route("/differentiate", post(differentiate))
        .route("/integrate", post(integrate))
        .route("/solve", post(solve))
        .route("/verify", post(verify))
        .route("/simplify", post(simplify))
        .route("/evaluate", post(evaluate))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

/// An address nothing listens on
async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

fn last(seen: &Seen) -> (String, Value) {
    seen.lock().unwrap().last().cloned().expect("no request recorded")
}

fn calculator(url: &str) -> Calculator {
    Calculator::new(Arc::new(SympyDelegate::new(url))).with_delegate_timeout(Duration::from_secs(2))
}

// ============ Tests ============

#[tokio::test]
async fn test_health() {
    let (url, _) = start_stub().await;
    let delegate = SympyDelegate::new(url);
    assert!(delegate.health().await.unwrap());
}

#[tokio::test]
async fn test_health_unreachable() {
    let addr = dead_addr().await;
    let delegate = SympyDelegate::new(format!("http://{}", addr));
    assert!(delegate.health().await.is_err());
}

#[tokio::test]
async fn test_delegate_sends_variable() {
    let (url, seen) = start_stub().await;
    let delegate = SympyDelegate::new(url);
    let request = SymbolicRequest::new(
        SymbolicOp::Differentiate { variable: "x".into(), order: 1 },
        numina::parse_expr("x^2").unwrap(),
    );

    let answer = timeout(Duration::from_secs(2), delegate.solve(&request))
        .await
        .expect("timeout")
        .unwrap();
    assert_eq!(answer.result, "2*x");
    assert_eq!(answer.latex, "2 x");
    assert_eq!(answer.backend_time_ms, Some(1.5));

    let (endpoint, body) = last(&seen);
    assert_eq!(endpoint, "differentiate");
    assert_eq!(body, json!({ "expression": "x^2", "variable": "x" }));
}

#[tokio::test]
async fn test_simplify_omits_variable() {
    let (url, seen) = start_stub().await;
    let ev = calculator(&url)
        .solve_symbolic("x + x", SymbolicOp::Simplify, &Bindings::new())
        .await;
    assert_eq!(ev.result.as_symbolic(), Some("2*x"));

    let (_, body) = last(&seen);
    assert_eq!(body, json!({ "expression": "x + x" }));
}

#[tokio::test]
async fn test_calculator_diff_through_sidecar() {
    let (url, _) = start_stub().await;
    let ev = calculator(&url).evaluate("diff(x^2, x)", &Bindings::new()).await;
    assert_eq!(ev.result, EvaluationResult::symbolic("2*x", "2 x", "diff(x^2, x)"));
    assert!(ev.metrics.delegate_call_time_ms.unwrap() > 0.0);
    assert!(ev.metrics.conversion_time_ms.is_some());
}

#[tokio::test]
async fn test_integrate_uses_sympy_syntax() {
    let (url, seen) = start_stub().await;
    let ev = calculator(&url)
        .evaluate("integrate(log(x) + e, x)", &Bindings::new())
        .await;
    // Reply powers are canonicalised
    assert_eq!(ev.result.as_symbolic(), Some("x^3/3"));

    let (endpoint, body) = last(&seen);
    assert_eq!(endpoint, "integrate");
    assert_eq!(body["expression"], "log(x, 10) + E");
    assert_eq!(body["variable"], "x");
}

#[tokio::test]
async fn test_equation_solves_for_free_variable() {
    let (url, seen) = start_stub().await;
    let ev = calculator(&url).evaluate("x^2 = 4", &Bindings::new()).await;
    assert_eq!(ev.result.as_symbolic(), Some("[-2, 2]"));

    let (endpoint, body) = last(&seen);
    assert_eq!(endpoint, "solve");
    assert_eq!(body, json!({ "expression": "x^2 - 4", "variable": "x" }));
}

#[tokio::test]
async fn test_closed_equation_is_verified() {
    let (url, seen) = start_stub().await;
    let ev = calculator(&url).evaluate("2 + 2 = 4", &Bindings::new()).await;
    assert_eq!(ev.result.as_symbolic(), Some("true"));
    assert_eq!(last(&seen).0, "verify");
}

#[tokio::test]
async fn test_bindings_substituted_before_delegation() {
    let (url, seen) = start_stub().await;
    let ev = calculator(&url).evaluate("Ans * x = 6", &Bindings::with_answer(3.0)).await;
    assert!(ev.result.as_symbolic().is_some());

    let (_, body) = last(&seen);
    assert_eq!(body["expression"], "3 * x - 6");
}

#[tokio::test]
async fn test_backend_error_body() {
    let (url, _) = start_stub().await;
    let ev = calculator(&url)
        .solve_symbolic("x + 1", SymbolicOp::Evaluate, &Bindings::new())
        .await;
    assert_eq!(ev.result, EvaluationResult::error("Invalid expression"));
}

#[tokio::test]
async fn test_unreachable_sidecar_is_error() {
    let addr = dead_addr().await;
    let calc = calculator(&format!("http://{}", addr));
    let ev = calc.evaluate("diff(x^2, x)", &Bindings::new()).await;
    let message = ev.result.failure_message().unwrap();
    assert!(message.starts_with("symbolic backend unreachable"), "{}", message);
}

#[tokio::test]
async fn test_unsupported_route_is_not_implemented() {
    let (url, seen) = start_stub().await;
    let ev = calculator(&url).evaluate("limit(sin(x)/x, x, 0)", &Bindings::new()).await;
    assert!(matches!(ev.result, EvaluationResult::NotImplemented { .. }));
    assert!(seen.lock().unwrap().is_empty());

    let err = numina::MathError::from(numina::DelegateError::Unsupported("x".into()));
    assert_eq!(err.kind, ErrorKind::DelegateUnsupported);
}
