//! Analytics report endpoints.
//!
//! These answer 503 when no analytics key is configured.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::analytics::queries::{
    DEFAULT_PROTOCOL_DAYS, DEFAULT_TOP_HOLDERS_LIMIT, DEFAULT_TRANSFER_DAYS, DEFAULT_TRANSFER_LIMIT,
};
use crate::analytics::{AnalyticsClient, SavedQuery};
use crate::http::request::param_or;
use crate::http::response::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    limit: Option<String>,
    days: Option<String>,
}

fn client<'a>(state: &'a AppState, operation: &str) -> Result<&'a AnalyticsClient, ApiError> {
    state
        .analytics
        .as_ref()
        .ok_or_else(|| ApiError::AnalyticsDisabled.logged(operation, ""))
}

async fn run_saved(state: &AppState, query: SavedQuery, subject: &str) -> Result<Json<Value>, ApiError> {
    let client = client(state, query.name())?;
    let result = client
        .run(&query)
        .await
        .map_err(|e| ApiError::from(e).logged(query.name(), subject))?;
    Ok(Json(result))
}

/// `GET /top-holders/{token}?limit=`
pub async fn top_holders(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Value>, ApiError> {
    let query = SavedQuery::TopHolders {
        token: token.clone(),
        limit: param_or(params.limit.as_deref(), DEFAULT_TOP_HOLDERS_LIMIT),
    };
    run_saved(&state, query, &token).await
}

/// `GET /token-transfers/{token}?days=&limit=`
pub async fn token_transfers(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Value>, ApiError> {
    let query = SavedQuery::TokenTransfers {
        token: token.clone(),
        days: param_or(params.days.as_deref(), DEFAULT_TRANSFER_DAYS),
        limit: param_or(params.limit.as_deref(), DEFAULT_TRANSFER_LIMIT),
    };
    run_saved(&state, query, &token).await
}

/// `GET /protocol-activity/{protocol}?days=`
pub async fn protocol_activity(
    State(state): State<AppState>,
    Path(protocol): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Value>, ApiError> {
    let query = SavedQuery::ProtocolActivity {
        protocol: protocol.clone(),
        days: param_or(params.days.as_deref(), DEFAULT_PROTOCOL_DAYS),
    };
    run_saved(&state, query, &protocol).await
}

/// `GET /balances/{wallet}`
pub async fn balances(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = client(&state, "balances")?;
    let result = client
        .balances(&wallet)
        .await
        .map_err(|e| ApiError::from(e).logged("balances", &wallet))?;
    Ok(Json(result))
}
