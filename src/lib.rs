//! Percept gateway library.
//!
//! Read-only HTTP API over Solana on-chain data and Dune analytics.

pub mod analytics;
pub mod blockchain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
