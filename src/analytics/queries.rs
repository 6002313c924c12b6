//! Saved analytics queries and their parameter sets.

use serde_json::{json, Value};

use crate::config::AnalyticsConfig;

pub const DEFAULT_TOP_HOLDERS_LIMIT: u32 = 10;
pub const DEFAULT_TRANSFER_DAYS: u32 = 7;
pub const DEFAULT_TRANSFER_LIMIT: u32 = 100;
pub const DEFAULT_PROTOCOL_DAYS: u32 = 30;

/// A saved query together with the parameters it is executed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedQuery {
    TopHolders { token: String, limit: u32 },
    TokenTransfers { token: String, days: u32, limit: u32 },
    ProtocolActivity { protocol: String, days: u32 },
}

impl SavedQuery {
    /// Configured query id.
    pub fn query_id<'a>(&self, config: &'a AnalyticsConfig) -> &'a str {
        match self {
            SavedQuery::TopHolders { .. } => &config.top_holders_query_id,
            SavedQuery::TokenTransfers { .. } => &config.token_transfers_query_id,
            SavedQuery::ProtocolActivity { .. } => &config.protocol_activity_query_id,
        }
    }

    /// `query_parameters` object sent with the execution request.
    pub fn parameters(&self) -> Value {
        match self {
            SavedQuery::TopHolders { token, limit } => json!({ "TOKEN": token, "N": limit }),
            SavedQuery::TokenTransfers { token, days, limit } => {
                json!({ "TOKEN": token, "DAYS": days, "LIMIT": limit })
            }
            SavedQuery::ProtocolActivity { protocol, days } => {
                json!({ "PROTOCOL": protocol, "DAYS": days })
            }
        }
    }

    /// Short name for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            SavedQuery::TopHolders { .. } => "top_holders",
            SavedQuery::TokenTransfers { .. } => "token_transfers",
            SavedQuery::ProtocolActivity { .. } => "protocol_activity",
        }
    }
}
