//! Configuration validation.
//!
//! Serde handles the syntactic side; this module checks values that parse
//! but cannot work (missing credentials, unparseable URLs, zero timeouts).
//! Every problem is reported, not just the first.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rpc.api_key.trim().is_empty() {
        errors.push(ValidationError::new(
            "rpc.api_key",
            "HELIUS_API_KEY not found in environment variables",
        ));
    }

    check_url(&mut errors, "rpc.base_url", &config.rpc.base_url);
    check_url(&mut errors, "analytics.query_api_base", &config.analytics.query_api_base);
    check_url(&mut errors, "analytics.echo_api_base", &config.analytics.echo_api_base);

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let timeouts = [
        ("rpc.timeout_ms", config.rpc.timeout_ms),
        ("rpc.history_timeout_ms", config.rpc.history_timeout_ms),
        ("analytics.request_timeout_ms", config.analytics.request_timeout_ms),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.rpc.detail_concurrency == 0 {
        errors.push(ValidationError::new("rpc.detail_concurrency", "must be at least 1"));
    }
    if config.analytics.max_poll_attempts == 0 {
        errors.push(ValidationError::new("analytics.max_poll_attempts", "must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if let Err(e) = Url::parse(value) {
        errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("invalid socket address '{}'", value)));
    }
}
