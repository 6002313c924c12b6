//! Query-service integration.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → queries.rs (saved query id + parameters)
//!     → client.rs (execute, poll until completed)
//!     → result document passed through to the caller
//! ```
//!
//! Disabled entirely when no API key is configured.

pub mod client;
pub mod queries;

pub use client::{AnalyticsClient, AnalyticsError, AnalyticsResult};
pub use queries::SavedQuery;
