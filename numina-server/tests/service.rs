//! Black-box tests for the local evaluation service
//!
//! Each test starts the service on an ephemeral port and talks to it over
//! real HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use numina::{
    Calculator, DelegateError, SymbolicAnswer, SymbolicDelegate, SymbolicRequest,
};
use numina_server::{serve, AppState};
use serde_json::{json, Value};
use tokio::time::timeout;

/// Never answers within any reasonable timeout
struct Stalled;

#[async_trait]
impl SymbolicDelegate for Stalled {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn solve(&self, _request: &SymbolicRequest) -> Result<SymbolicAnswer, DelegateError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(DelegateError::Backend("unreachable".into()))
    }
}

/// Answers every request with a fixed expression
struct Canned;

#[async_trait]
impl SymbolicDelegate for Canned {
    fn name(&self) -> &str {
        "canned"
    }

    async fn solve(&self, _request: &SymbolicRequest) -> Result<SymbolicAnswer, DelegateError> {
        Ok(SymbolicAnswer {
            result: "x**2/2".into(),
            latex: "\\frac{x^{2}}{2}".into(),
            verified: None,
            backend_time_ms: None,
        })
    }
}

async fn start(calculator: Calculator) -> SocketAddr {
    start_with(AppState::new(calculator)).await
}

async fn start_with(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(state);
    tokio::spawn(async move {
        serve(listener, state).await.unwrap();
    });
    addr
}

async fn post_raw(addr: SocketAddr, body: impl Into<reqwest::Body>) -> (u16, Value) {
    let resp = timeout(
        Duration::from_secs(5),
        reqwest::Client::new()
            .post(format!("http://{}/", addr))
            .header("content-type", "application/json")
            .body(body)
            .send(),
    )
    .await
    .expect("Timeout waiting for response")
    .expect("request failed");
    let status = resp.status().as_u16();
    let json = resp.json().await.expect("response is not JSON");
    (status, json)
}

async fn post_text(addr: SocketAddr, text: &str) -> Value {
    let (status, json) = post_raw(addr, json!({ "text": text }).to_string()).await;
    assert_eq!(status, 200);
    json
}

// ============ Tests ============

#[tokio::test]
async fn test_simple_sum() {
    let addr = start(Calculator::numeric_only()).await;
    let reply = post_text(addr, "2+2").await;
    assert_eq!(reply, json!({ "success": true, "expression": "2+2", "result": 4 }));
}

#[tokio::test]
async fn test_fractional_result() {
    let addr = start(Calculator::numeric_only()).await;
    let reply = post_text(addr, "7/2").await;
    assert_eq!(reply["result"], json!(3.5));
}

#[tokio::test]
async fn test_division_by_zero_is_failure() {
    let addr = start(Calculator::numeric_only()).await;
    let reply = post_text(addr, "1/0").await;
    assert_eq!(reply["success"], json!(false));
    assert!(!reply["error"].as_str().unwrap().is_empty());
    assert!(reply.get("result").is_none());
}

#[tokio::test]
async fn test_parse_error_is_failure() {
    let addr = start(Calculator::numeric_only()).await;
    let reply = post_text(addr, "(2+3").await;
    assert_eq!(reply["success"], json!(false));
    assert!(reply["error"].as_str().unwrap().contains("position 0"));
}

#[tokio::test]
async fn test_malformed_json_is_failure() {
    let addr = start(Calculator::numeric_only()).await;
    for body in ["{not json", "", "{\"txt\": \"2+2\"}", "[1, 2]"] {
        let (status, reply) = post_raw(addr, body.to_string()).await;
        assert_eq!(status, 200);
        assert_eq!(reply["success"], json!(false), "body {:?}", body);
        assert!(reply["error"].as_str().unwrap().starts_with("Invalid request"));
    }
}

#[tokio::test]
async fn test_deeply_nested_text_is_failure() {
    let addr = start(Calculator::numeric_only()).await;
    let text = format!("{}1", "-".repeat(200_000));
    let reply = post_text(addr, &text).await;
    assert_eq!(reply["success"], json!(false));
    assert!(reply["error"].as_str().unwrap().contains("nested too deeply"));

    // The service is still up afterwards
    assert_eq!(post_text(addr, "2+2").await["result"], json!(4));
}

#[tokio::test]
async fn test_large_body_is_failure_json() {
    let addr = start(Calculator::numeric_only()).await;
    let text = "1+".repeat(1_500_000) + "1";
    let reply = post_text(addr, &text).await;
    assert_eq!(reply["success"], json!(false));
    assert!(reply["error"].as_str().unwrap().starts_with("Parse error"));
}

#[tokio::test]
async fn test_body_over_limit_is_failure_json() {
    let addr = start_with(AppState::new(Calculator::numeric_only()).with_body_limit(1024)).await;
    let body = json!({ "text": "1+".repeat(2048) + "1" }).to_string();
    let (status, reply) = post_raw(addr, body).await;
    assert_eq!(status, 200);
    assert_eq!(reply["success"], json!(false));
    assert!(reply["error"].as_str().unwrap().starts_with("Invalid request"));
}

#[tokio::test]
async fn test_no_answer_carry_over() {
    let addr = start(Calculator::numeric_only()).await;
    assert_eq!(post_text(addr, "5").await["result"], json!(5));
    let reply = post_text(addr, "Ans + 1").await;
    assert_eq!(reply["success"], json!(false));
}

#[tokio::test]
async fn test_symbolic_result_is_string() {
    let addr = start(Calculator::new(Arc::new(Canned))).await;
    let reply = post_text(addr, "integrate(x, x)").await;
    assert_eq!(
        reply,
        json!({ "success": true, "expression": "integrate(x, x)", "result": "x^2/2" })
    );
}

#[tokio::test]
async fn test_delegate_timeout_is_failure() {
    let calc = Calculator::new(Arc::new(Stalled)).with_delegate_timeout(Duration::from_millis(100));
    let addr = start(calc).await;
    let reply = post_text(addr, "diff(x^3, x)").await;
    assert_eq!(
        reply,
        json!({ "success": false, "error": "symbolic evaluation timed out" })
    );
}

#[tokio::test]
async fn test_concurrent_requests() {
    let addr = start(Calculator::numeric_only()).await;
    let handles: Vec<_> = (0..16)
        .map(|i| tokio::spawn(async move { (i, post_text(addr, &format!("{} * {}", i, i)).await) }))
        .collect();

    for handle in handles {
        let (i, reply) = handle.await.unwrap();
        assert_eq!(reply["result"], json!(i * i));
    }
}

#[tokio::test]
async fn test_other_paths_not_served() {
    let addr = start(Calculator::numeric_only()).await;
    let resp = reqwest::Client::new()
        .get(format!("http://{}/", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 405);
}
