//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, request span, query parsing)
//!     → api.rs / reports.rs / status.rs (handlers)
//!     → blockchain / analytics clients
//!     → response.rs (error → status + JSON body)
//!     → Send to client
//! ```

pub mod api;
pub mod reports;
pub mod request;
pub mod response;
pub mod server;
pub mod status;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer, ServerError};
