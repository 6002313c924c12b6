//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Inbound HTTP behaviour.
    pub http: HttpConfig,

    /// Upstream JSON-RPC provider settings.
    pub rpc: RpcConfig,

    /// Query-service (Dune) settings and analytics output toggles.
    pub analytics: AnalyticsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Inbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Attach a permissive CORS layer.
    pub cors_enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_enabled: true,
        }
    }
}

/// Upstream JSON-RPC provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Provider base URL; the API key is appended as `?api-key=`.
    pub base_url: String,

    /// Provider API key. Required.
    pub api_key: String,

    /// Per-call timeout for holder and token-account lookups.
    pub timeout_ms: u64,

    /// Per-call timeout for signature history lookups.
    pub history_timeout_ms: u64,

    /// In-flight `getTokenSupply` calls when fetching token details.
    pub detail_concurrency: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mainnet.helius-rpc.com".to_string(),
            api_key: String::new(),
            timeout_ms: 20_000,
            history_timeout_ms: 30_000,
            detail_concurrency: 4,
        }
    }
}

/// Query-service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Dune API key. Analytics routes are disabled without one.
    pub dune_api_key: Option<String>,

    /// Base URL of the query execution API.
    pub query_api_base: String,

    /// Base URL of the balances API.
    pub echo_api_base: String,

    /// Result polls before a query execution is abandoned.
    pub max_poll_attempts: u32,

    /// Delay between result polls in milliseconds.
    pub poll_delay_ms: u64,

    /// Timeout for each individual query-service request.
    pub request_timeout_ms: u64,

    pub top_holders_query_id: String,
    pub token_transfers_query_id: String,
    pub protocol_activity_query_id: String,

    /// Render transaction timestamps in UTC instead of server local time.
    pub utc_timestamps: bool,

    /// Include per-day buckets in transaction analytics.
    pub emit_daily_activity: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            dune_api_key: None,
            query_api_base: "https://api.dune.com/api/v1".to_string(),
            echo_api_base: "https://api.dune.com/api/echo/v1".to_string(),
            max_poll_attempts: 10,
            poll_delay_ms: 2_000,
            request_timeout_ms: 20_000,
            top_holders_query_id: "1234567".to_string(),
            token_transfers_query_id: "1234568".to_string(),
            protocol_activity_query_id: "1234569".to_string(),
            utc_timestamps: false,
            emit_daily_activity: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
