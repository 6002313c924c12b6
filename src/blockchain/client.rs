//! Upstream JSON-RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Build JSON-RPC 2.0 envelopes and POST them to the provider endpoint
//! - Enforce a per-call timeout on the network round trip
//! - Unwrap the provider's `result` / `error` envelope
//! - Classify failures (timeout, transport, RPC, malformed response)
//!
//! Calls are made exactly once. Retrying is left to the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

use crate::blockchain::types::{BlockchainError, BlockchainResult, RpcConfig};
use crate::observability::metrics;

/// JSON-RPC 2.0 request envelope. The method name doubles as the call id.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'a str,
    method: &'a str,
    params: &'a [Value],
}

/// Provider RPC client.
///
/// Stateless apart from its pooled HTTP connections; clone freely.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    /// Endpoint with the API key already embedded.
    endpoint: Url,
    /// Per-call timeout for holder and token-account lookups.
    pub(crate) timeout: Duration,
    /// Per-call timeout for signature history lookups.
    pub(crate) history_timeout: Duration,
    /// Concurrent supply lookups when attaching token details.
    pub(crate) detail_concurrency: usize,
}

impl RpcClient {
    /// Create a new client from configuration.
    ///
    /// No network traffic happens here; a bad key only shows up on the
    /// first call.
    pub fn new(config: &RpcConfig) -> BlockchainResult<Self> {
        let mut endpoint = Url::parse(&config.base_url).map_err(|e| {
            BlockchainError::Transport(format!("Invalid RPC URL '{}': {}", config.base_url, e))
        })?;
        endpoint.query_pairs_mut().append_pair("api-key", &config.api_key);

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BlockchainError::Transport(e.to_string()))?;

        tracing::info!(
            host = endpoint.host_str().unwrap_or("unknown"),
            timeout_ms = config.timeout_ms,
            history_timeout_ms = config.history_timeout_ms,
            "RPC client initialized"
        );

        Ok(Self {
            http,
            endpoint,
            timeout: Duration::from_millis(config.timeout_ms),
            history_timeout: Duration::from_millis(config.history_timeout_ms),
            detail_concurrency: config.detail_concurrency.max(1),
        })
    }

    /// Issue a single JSON-RPC call and return its `result` value.
    pub async fn call(
        &self,
        method: &str,
        params: Vec<Value>,
        limit: Duration,
    ) -> BlockchainResult<Value> {
        let start = Instant::now();
        let result = self.send(method, &params, limit).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(BlockchainError::Timeout(_)) => "timeout",
            Err(BlockchainError::Rpc(_)) => "rpc_error",
            Err(_) => "error",
        };
        metrics::record_upstream_call(method, outcome, start);

        if let Err(e) = &result {
            tracing::warn!(method = %method, error = %e, "RPC call failed");
        }
        result
    }

    /// Issue a call and decode its `result` into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
        limit: Duration,
    ) -> BlockchainResult<T> {
        let value = self.call(method, params, limit).await?;
        serde_json::from_value(value).map_err(|e| BlockchainError::Decode {
            method: method.to_string(),
            reason: e.to_string(),
        })
    }

    async fn send(&self, method: &str, params: &[Value], limit: Duration) -> BlockchainResult<Value> {
        let timeout_ms = limit.as_millis() as u64;
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: method,
            method,
            params,
        };

        let round_trip = async {
            let response = self
                .http
                .post(self.endpoint.clone())
                .json(&request)
                .send()
                .await
                .map_err(|e| transport_error(e, timeout_ms))?;

            let status = response.status();
            if !status.is_success() {
                return Err(BlockchainError::Transport(format!(
                    "{} returned by RPC provider",
                    status
                )));
            }

            response.json::<Value>().await.map_err(|e| {
                if e.is_decode() {
                    BlockchainError::Decode {
                        method: method.to_string(),
                        reason: e.to_string(),
                    }
                } else {
                    transport_error(e, timeout_ms)
                }
            })
        };

        let body = match timeout(limit, round_trip).await {
            Ok(body) => body?,
            Err(_) => return Err(BlockchainError::Timeout(timeout_ms)),
        };
        unwrap_envelope(method, body)
    }
}

/// Classify a reqwest failure. The URL is stripped because it carries the
/// API key.
fn transport_error(e: reqwest::Error, timeout_ms: u64) -> BlockchainError {
    if e.is_timeout() {
        BlockchainError::Timeout(timeout_ms)
    } else {
        BlockchainError::Transport(e.without_url().to_string())
    }
}

/// Extract `result` from a JSON-RPC response body, or surface its `error`.
pub(crate) fn unwrap_envelope(method: &str, body: Value) -> BlockchainResult<Value> {
    let Value::Object(mut body) = body else {
        return Err(BlockchainError::Decode {
            method: method.to_string(),
            reason: "response is not a JSON object".to_string(),
        });
    };

    match body.remove("error") {
        None | Some(Value::Null) => {}
        Some(error) => return Err(BlockchainError::Rpc(error.to_string())),
    }

    body.remove("result").ok_or_else(|| BlockchainError::Decode {
        method: method.to_string(),
        reason: "missing result".to_string(),
    })
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("host", &self.endpoint.host_str())
            .field("timeout", &self.timeout)
            .field("history_timeout", &self.history_timeout)
            .finish()
    }
}
