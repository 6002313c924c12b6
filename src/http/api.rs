//! On-chain data endpoints under `/api`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::blockchain::signatures::DEFAULT_SIGNATURE_LIMIT;
use crate::blockchain::{Holder, SignatureHistory, SignatureQuery, TokenAccountsResult};
use crate::http::request::saturating_count;
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// `GET /api/token-holders/{mint}/{limit}`
pub async fn token_holders(
    State(state): State<AppState>,
    Path((mint, limit)): Path<(String, String)>,
) -> Result<Json<Vec<Holder>>, ApiError> {
    // Oversized limits saturate; the provider returns at most 20 accounts.
    let top_n = saturating_count(&limit)
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .ok_or_else(|| {
            ApiError::BadRequest(format!("Invalid limit: {}", limit)).logged("token_holders", &mint)
        })?;

    let holders = state
        .rpc
        .top_holders(&mint, top_n)
        .await
        .map_err(|e| {
            ApiError::from(e)
                .with_address_label("Invalid token mint address")
                .logged("token_holders", &mint)
        })?;
    Ok(Json(holders))
}

#[derive(Debug, Default, Deserialize)]
pub struct TokensParams {
    include_details: Option<String>,
}

/// `GET /api/wallet/tokens/{owner}?include_details=`
///
/// Details are on unless the flag is present and not `true`.
pub async fn wallet_tokens(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(params): Query<TokensParams>,
) -> Result<Json<TokenAccountsResult>, ApiError> {
    let include_details = params
        .include_details
        .as_deref()
        .map_or(true, |v| v.eq_ignore_ascii_case("true"));

    let result = state
        .rpc
        .token_accounts(&owner, include_details)
        .await
        .map_err(|e| {
            ApiError::from(e)
                .with_address_label("Invalid wallet address")
                .logged("wallet_tokens", &owner)
        })?;
    Ok(Json(result))
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionsParams {
    limit: Option<String>,
    before: Option<String>,
    until: Option<String>,
}

/// `GET /api/transactions/{address}?limit=&before=&until=`
pub async fn transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(params): Query<TransactionsParams>,
) -> Result<Json<SignatureHistory>, ApiError> {
    // Digit strings past u32 saturate and are clamped to the page maximum.
    let limit = params
        .limit
        .as_deref()
        .and_then(saturating_count)
        .map_or(DEFAULT_SIGNATURE_LIMIT, |n| u32::try_from(n).unwrap_or(u32::MAX));
    let query = SignatureQuery {
        limit,
        before: params.before,
        until: params.until,
        address,
    };

    let history = state
        .rpc
        .signature_history(&query, state.activity)
        .await
        .map_err(|e| {
            ApiError::from(e)
                .with_address_label("Invalid address")
                .logged("transactions", &query.address)
        })?;
    Ok(Json(history))
}
