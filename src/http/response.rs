//! Error responses.
//!
//! Every failure leaves the gateway as `{"error": "<message>"}`:
//!
//! | cause                         | status |
//! |-------------------------------|--------|
//! | invalid address / parameter   | 400    |
//! | upstream timeout              | 504    |
//! | upstream error mentioning 403 | 403    |
//! | other upstream error          | 500    |
//! | analytics not configured      | 503    |
//! | anything else                 | 500    |
//!
//! Upstream messages are passed through; unexpected failures get a
//! generic message and are logged in full.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::analytics::AnalyticsError;
use crate::blockchain::BlockchainError;

pub const TIMEOUT_MESSAGE: &str = "Helius API timed out";
pub const UNEXPECTED_MESSAGE: &str = "Unexpected server error";
pub const ANALYTICS_DISABLED_MESSAGE: &str = "Analytics service disabled";

/// Failure of an API handler.
#[derive(Debug)]
pub enum ApiError {
    Blockchain(BlockchainError),
    Analytics(AnalyticsError),
    BadRequest(String),
    AnalyticsDisabled,
}

impl From<BlockchainError> for ApiError {
    fn from(e: BlockchainError) -> Self {
        ApiError::Blockchain(e)
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        ApiError::Analytics(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AnalyticsDisabled => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Analytics(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Blockchain(e) => match e {
                BlockchainError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
                BlockchainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                BlockchainError::Transport(_) | BlockchainError::Rpc(_) => {
                    if e.to_string().contains("403") {
                        StatusCode::FORBIDDEN
                    } else {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                }
                BlockchainError::Decode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message shown to the caller.
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::AnalyticsDisabled => ANALYTICS_DISABLED_MESSAGE.to_string(),
            ApiError::Analytics(e) => e.to_string(),
            ApiError::Blockchain(e) => match e {
                BlockchainError::Timeout(_) => TIMEOUT_MESSAGE.to_string(),
                BlockchainError::Decode { .. } => UNEXPECTED_MESSAGE.to_string(),
                _ => e.to_string(),
            },
        }
    }

    /// Reword an invalid-address failure as `"<label>: <address>"`.
    pub fn with_address_label(self, label: &str) -> Self {
        match self {
            ApiError::Blockchain(BlockchainError::InvalidAddress(address)) => {
                ApiError::BadRequest(format!("{}: {}", label, address))
            }
            other => other,
        }
    }

    /// Log the failure with its operation context and hand it back.
    pub fn logged(self, operation: &str, subject: &str) -> Self {
        match &self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(operation, subject, error = %msg, "Rejected request");
            }
            ApiError::Blockchain(BlockchainError::InvalidAddress(_)) => {
                tracing::warn!(operation, subject, error = %self.message(), "Validation error");
            }
            ApiError::Blockchain(BlockchainError::Timeout(ms)) => {
                tracing::error!(operation, subject, timeout_ms = ms, "Upstream timeout");
            }
            ApiError::Blockchain(e @ BlockchainError::Decode { .. }) => {
                tracing::error!(operation, subject, error = ?e, "Unexpected error");
            }
            ApiError::Blockchain(e) => {
                tracing::error!(operation, subject, error = %e, "Upstream service error");
            }
            ApiError::Analytics(e) => {
                tracing::error!(operation, subject, error = %e, "Analytics query failed");
            }
            ApiError::AnalyticsDisabled => {
                tracing::debug!(operation, "Analytics request while disabled");
            }
        }
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.message())
    }
}

/// JSON error body with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blockchain(e: BlockchainError) -> ApiError {
        ApiError::from(e)
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            blockchain(BlockchainError::InvalidAddress("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(blockchain(BlockchainError::Timeout(1)).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            blockchain(BlockchainError::Transport("403 Forbidden returned by RPC provider".into())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            blockchain(BlockchainError::Rpc(r#"{"code":403,"message":"nope"}"#.into())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            blockchain(BlockchainError::Rpc(r#"{"code":-32602}"#.into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::AnalyticsDisabled.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_messages() {
        assert_eq!(blockchain(BlockchainError::Timeout(1)).message(), TIMEOUT_MESSAGE);
        let decode = BlockchainError::Decode {
            method: "getTokenSupply".into(),
            reason: "missing field".into(),
        };
        assert_eq!(blockchain(decode).message(), UNEXPECTED_MESSAGE);
        assert_eq!(
            blockchain(BlockchainError::InvalidAddress("abc".into())).message(),
            "Invalid base58 public key: abc"
        );
        let labelled = blockchain(BlockchainError::InvalidAddress("abc".into()))
            .with_address_label("Invalid wallet address");
        assert_eq!(labelled.status(), StatusCode::BAD_REQUEST);
        assert_eq!(labelled.message(), "Invalid wallet address: abc");
        assert_eq!(
            blockchain(BlockchainError::Timeout(1))
                .with_address_label("Invalid address")
                .message(),
            TIMEOUT_MESSAGE
        );
        assert_eq!(
            ApiError::Analytics(AnalyticsError::Timeout(3)).message(),
            "Dune query execution timed out after 3 polls"
        );
    }
}
