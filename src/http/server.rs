//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the upstream clients once and share them with every handler
//! - Create the Axum router with all routes
//! - Wire up middleware (request ID, tracing, CORS, metrics)
//! - Serve on a listener until the shutdown signal fires
//!
//! There is no whole-request deadline; each upstream call carries its own
//! timeout.

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::analytics::{AnalyticsClient, AnalyticsError};
use crate::blockchain::{ActivityOptions, BlockchainError, RpcClient};
use crate::config::GatewayConfig;
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::http::{api, reports, status};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rpc: RpcClient,
    pub analytics: Option<AnalyticsClient>,
    pub activity: ActivityOptions,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn from_config(config: GatewayConfig) -> Result<Self, ServerError> {
        let rpc = RpcClient::new(&config.rpc)?;
        let analytics = AnalyticsClient::from_config(&config.analytics)?;
        Ok(Self {
            rpc,
            analytics,
            activity: ActivityOptions::from(&config.analytics),
            config: Arc::new(config),
        })
    }
}

/// Failure to construct the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build RPC client: {0}")]
    Rpc(#[from] BlockchainError),

    #[error("failed to build analytics client: {0}")]
    Analytics(#[from] AnalyticsError),
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(config)?;
        let config = state.config.clone();
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", get(status::index))
            .route("/health", get(status::health))
            .route("/api/token-holders/{mint}/{limit}", get(api::token_holders))
            .route("/api/wallet/tokens/{owner}", get(api::wallet_tokens))
            .route("/api/transactions/{address}", get(api::transactions))
            .route("/top-holders/{token}", get(reports::top_holders))
            .route("/token-transfers/{token}", get(reports::token_transfers))
            .route("/protocol-activity/{protocol}", get(reports::protocol_activity))
            .route("/balances/{wallet}", get(reports::balances))
            .route_layer(middleware::from_fn(metrics::track_requests))
            .fallback(status::not_found)
            .with_state(state);

        let router = if config.http.cors_enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        };

        router.layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(propagate_request_id_layer()),
        )
    }

    /// Run the server on `listener` until `shutdown` fires, then drain
    /// in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            cors_enabled = self.config.http.cors_enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
