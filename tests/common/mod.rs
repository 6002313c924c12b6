//! Shared utilities for integration testing.
//!
//! Each helper binds to an ephemeral port on 127.0.0.1 so tests can run in
//! parallel.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use percept_gateway::config::GatewayConfig;
use percept_gateway::http::HttpServer;
use percept_gateway::lifecycle::Shutdown;

pub const TEST_API_KEY: &str = "test-helius-key";
pub const TEST_DUNE_KEY: &str = "test-dune-key";

/// Reply of the mock RPC provider to one call.
pub enum Reply {
    /// 200 with `{"result": value}`.
    Result(Value),
    /// 200 with `{"error": value}`.
    Error(Value),
    /// Bare HTTP status with an empty body.
    Status(u16),
    /// `Result` after a delay.
    Slow(Duration, Value),
}

type Handler = dyn Fn(&str, &Value) -> Reply + Send + Sync;

#[derive(Clone)]
struct RpcState {
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

/// Mock JSON-RPC provider recording every `(method, params)` it receives.
pub struct MockRpc {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockRpc {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }
}

/// Start a mock RPC provider answering each call with `handler`.
pub async fn start_mock_rpc<F>(handler: F) -> MockRpc
where
    F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
{
    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = RpcState {
        handler: Arc::new(handler),
        calls: calls.clone(),
    };
    let app = Router::new().route("/", post(rpc_handler)).with_state(state);
    let addr = serve(app).await;
    MockRpc { addr, calls }
}

async fn rpc_handler(State(state): State<RpcState>, Json(body): Json<Value>) -> Response {
    let method = body["method"].as_str().unwrap_or_default().to_string();
    let params = body["params"].clone();
    let id = body["id"].clone();
    state.calls.lock().unwrap().push((method.clone(), params.clone()));

    match (state.handler)(&method, &params) {
        Reply::Result(result) => Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })).into_response(),
        Reply::Error(error) => Json(json!({ "jsonrpc": "2.0", "id": id, "error": error })).into_response(),
        Reply::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Reply::Slow(delay, result) => {
            tokio::time::sleep(delay).await;
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })).into_response()
        }
    }
}

/// `{"context": ..., "value": value}` as returned by context-wrapped methods.
pub fn with_context(value: Value) -> Value {
    json!({ "context": { "slot": 1 }, "value": value })
}

/// A token amount object.
pub fn amount(raw: &str, decimals: u8, ui: f64) -> Value {
    json!({
        "amount": raw,
        "decimals": decimals,
        "uiAmount": ui,
        "uiAmountString": ui.to_string(),
    })
}

/// Mock Dune server: executions complete on poll number `complete_after`.
pub struct MockDune {
    pub addr: SocketAddr,
    pub polls: Arc<AtomicU32>,
    pub executions: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockDune {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

#[derive(Clone)]
struct DuneState {
    complete_after: u32,
    polls: Arc<AtomicU32>,
    executions: Arc<Mutex<Vec<(String, Value)>>>,
}

pub async fn start_mock_dune(complete_after: u32) -> MockDune {
    let polls = Arc::new(AtomicU32::new(0));
    let executions = Arc::new(Mutex::new(Vec::new()));
    let state = DuneState {
        complete_after,
        polls: polls.clone(),
        executions: executions.clone(),
    };

    let app = Router::new()
        .route("/query/{id}/execute", post(dune_execute))
        .route("/execution/{id}/results", get(dune_results))
        .route("/balances/svm/{wallet}", get(dune_balances))
        .with_state(state);
    let addr = serve(app).await;
    MockDune {
        addr,
        polls,
        executions,
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("X-Dune-Api-Key").and_then(|v| v.to_str().ok()) == Some(TEST_DUNE_KEY)
}

async fn dune_execute(
    State(state): State<DuneState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state
        .executions
        .lock()
        .unwrap()
        .push((id, body["query_parameters"].clone()));
    Json(json!({ "execution_id": "exec-1", "state": "QUERY_STATE_PENDING" })).into_response()
}

async fn dune_results(State(state): State<DuneState>, Path(id): Path<String>) -> Json<Value> {
    let poll = state.polls.fetch_add(1, Ordering::SeqCst) + 1;
    if poll >= state.complete_after {
        Json(json!({
            "execution_id": id,
            "state": "QUERY_STATE_COMPLETED",
            "result": { "rows": [{ "holder": "abc", "balance": 42 }] }
        }))
    } else {
        Json(json!({ "execution_id": id, "state": "QUERY_STATE_EXECUTING" }))
    }
}

async fn dune_balances(
    Path(wallet): Path<String>,
    headers: HeaderMap,
    axum::extract::Query(query): axum::extract::Query<std::collections::HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "wallet_address": wallet,
        "chains": query.get("chains"),
        "balances": [{ "symbol": "SOL", "amount": "1000000000" }]
    }))
    .into_response()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Gateway config pointed at a mock provider, analytics disabled.
pub fn test_config(rpc_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.rpc.base_url = rpc_url.to_string();
    config.rpc.api_key = TEST_API_KEY.to_string();
    config.analytics.utc_timestamps = true;
    config
}

/// Running gateway; dropping it stops the server.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    _shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let res = self.client.get(self.url(path)).send().await.expect("gateway unreachable");
        let status = res.status().as_u16();
        let body = res.json().await.unwrap_or(Value::Null);
        (status, body)
    }
}

pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).expect("server should build");

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    TestGateway {
        addr,
        client,
        _shutdown: shutdown,
    }
}
