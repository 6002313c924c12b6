//! Service status, liveness and the not-found fallback.

use axum::{extract::State, http::StatusCode, response::Response, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::http::response::error_response;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub service: &'static str,
    pub version: &'static str,
    pub analytics_enabled: bool,
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        analytics_enabled: state.analytics.is_some(),
    })
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "message": {
            "status": "healthy",
            "description": "Percept gateway is running!"
        }
    }))
}

pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
