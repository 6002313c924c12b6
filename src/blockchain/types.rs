//! Provider wire types, error definitions and shared numeric helpers.

use serde::Deserialize;
use thiserror::Error;

// Re-export RpcConfig from config module to avoid duplication
pub use crate::config::schema::RpcConfig;

/// JSON-RPC methods issued against the provider.
pub const GET_TOKEN_LARGEST_ACCOUNTS: &str = "getTokenLargestAccounts";
pub const GET_TOKEN_SUPPLY: &str = "getTokenSupply";
pub const GET_TOKEN_ACCOUNTS_BY_OWNER: &str = "getTokenAccountsByOwner";
pub const GET_SIGNATURES_FOR_ADDRESS: &str = "getSignaturesForAddress";

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Input was not a base-58 encoded 32-byte public key.
    #[error("Invalid base58 public key: {0}")]
    InvalidAddress(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} ms")]
    Timeout(u64),

    /// Network failure or non-success HTTP status from the provider.
    #[error("HTTP error: {0}")]
    Transport(String),

    /// Provider answered with a JSON-RPC `error` object.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Provider answered with a body we could not interpret.
    #[error("Malformed {method} response: {reason}")]
    Decode { method: String, reason: String },
}

impl BlockchainError {
    /// Whether the error originated at the provider (transport or RPC level).
    pub fn is_upstream(&self) -> bool {
        matches!(self, BlockchainError::Transport(_) | BlockchainError::Rpc(_))
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// The `{ context, value }` wrapper most Solana RPC results come in.
#[derive(Debug, Clone, Deserialize)]
pub struct WithContext<T> {
    pub value: T,
}

/// A token balance as reported by the provider.
///
/// Defaults: `amount` is `"0"`, `decimals` is 0, and a missing `uiAmount`
/// falls back to `uiAmountString`, then to `amount / 10^decimals`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenAmount {
    pub amount: String,
    pub decimals: u8,
    pub ui_amount: Option<f64>,
    pub ui_amount_string: Option<String>,
}

impl Default for TokenAmount {
    fn default() -> Self {
        Self {
            amount: "0".to_string(),
            decimals: 0,
            ui_amount: None,
            ui_amount_string: None,
        }
    }
}

impl TokenAmount {
    /// Raw integer amount rescaled by the decimal count.
    pub fn scaled_amount(&self) -> f64 {
        let raw = self.amount.parse::<f64>().unwrap_or(0.0);
        raw / 10f64.powi(i32::from(self.decimals))
    }

    /// Human-scaled balance.
    pub fn ui_value(&self) -> f64 {
        self.ui_amount
            .or_else(|| self.ui_amount_string.as_deref().and_then(|s| s.parse().ok()))
            .unwrap_or_else(|| self.scaled_amount())
    }
}

/// Round to `places` decimal places, halves away from zero.
pub fn round_dp(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
