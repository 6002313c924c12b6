//! Query-service client: saved-query execution and wallet balances.
//!
//! # Responsibilities
//! - Start a saved query execution and poll until it completes
//! - Fetch wallet balances from the balances API
//! - Bound every request with the configured timeout

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::analytics::queries::SavedQuery;
use crate::config::AnalyticsConfig;
use crate::observability::metrics;

const API_KEY_HEADER: &str = "X-Dune-Api-Key";
const QUERY_STATE_COMPLETED: &str = "QUERY_STATE_COMPLETED";

/// Errors from the query service.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Network failure or non-success HTTP status.
    #[error("HTTP error: {0}")]
    Transport(String),

    /// The execution did not complete within the polling budget.
    #[error("Dune query execution timed out after {0} polls")]
    Timeout(u32),

    /// The service answered with a body we could not interpret.
    #[error("Malformed analytics response: {0}")]
    Decode(String),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[derive(Debug, Deserialize)]
struct ExecutionStarted {
    execution_id: String,
}

/// Client for the query and balances APIs.
#[derive(Clone)]
pub struct AnalyticsClient {
    http: reqwest::Client,
    api_key: String,
    config: AnalyticsConfig,
    poll_delay: Duration,
}

impl AnalyticsClient {
    /// Build a client, or `None` when no API key is configured.
    pub fn from_config(config: &AnalyticsConfig) -> AnalyticsResult<Option<Self>> {
        let Some(api_key) = config.dune_api_key.clone().filter(|k| !k.is_empty()) else {
            tracing::info!("Analytics API key not configured, analytics routes disabled");
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| AnalyticsError::Transport(e.to_string()))?;

        Ok(Some(Self {
            http,
            api_key,
            config: config.clone(),
            poll_delay: Duration::from_millis(config.poll_delay_ms),
        }))
    }

    /// Execute a saved query and return the completed result document.
    pub async fn run(&self, query: &SavedQuery) -> AnalyticsResult<Value> {
        let start = Instant::now();
        let result = self
            .execute_query(query.query_id(&self.config), query.parameters())
            .await;
        metrics::record_upstream_call(query.name(), if result.is_ok() { "ok" } else { "error" }, start);
        result
    }

    /// Start an execution of `query_id`, then poll its results until the
    /// state is completed or the attempts run out.
    pub async fn execute_query(&self, query_id: &str, parameters: Value) -> AnalyticsResult<Value> {
        let base = self.config.query_api_base.trim_end_matches('/');

        let started: ExecutionStarted = self
            .send(
                self.http
                    .post(format!("{}/query/{}/execute", base, query_id))
                    .json(&json!({ "query_parameters": parameters })),
            )
            .await?;
        tracing::debug!(query_id = %query_id, execution_id = %started.execution_id, "Query execution started");

        let results_url = format!("{}/execution/{}/results", base, started.execution_id);
        let attempts = self.config.max_poll_attempts;
        for attempt in 1..=attempts {
            let data: Value = self.send(self.http.get(results_url.as_str())).await?;
            let state = data.get("state").and_then(Value::as_str).unwrap_or("unknown");
            if state == QUERY_STATE_COMPLETED {
                return Ok(data);
            }
            tracing::debug!(
                execution_id = %started.execution_id,
                attempt,
                state,
                "Query not complete yet"
            );
            if attempt < attempts {
                tokio::time::sleep(self.poll_delay).await;
            }
        }

        tracing::warn!(query_id = %query_id, attempts, "Query execution did not complete");
        Err(AnalyticsError::Timeout(attempts))
    }

    /// Solana balances held by `wallet`, passed through unmodified.
    pub async fn balances(&self, wallet: &str) -> AnalyticsResult<Value> {
        let url = format!(
            "{}/balances/svm/{}",
            self.config.echo_api_base.trim_end_matches('/'),
            wallet
        );
        self.send(self.http.get(url).query(&[("chains", "solana")])).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AnalyticsResult<T> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AnalyticsError::Transport(e.to_string()))?;

        response.json::<T>().await.map_err(|e| AnalyticsError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for AnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("query_api_base", &self.config.query_api_base)
            .field("echo_api_base", &self.config.echo_api_base)
            .field("max_poll_attempts", &self.config.max_poll_attempts)
            .finish()
    }
}
