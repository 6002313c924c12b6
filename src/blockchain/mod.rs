//! Blockchain data subsystem.
//!
//! # Data Flow
//! ```text
//! Caller-supplied address
//!     → address.rs (base-58 public key validation)
//!     → client.rs (JSON-RPC call with per-call timeout)
//!     → holders.rs / accounts.rs / signatures.rs (aggregation)
//!     → typed response object
//! ```
//!
//! # Constraints
//! - Validation happens before any network traffic
//! - Calls within one operation are sequential, except the bounded
//!   supply-detail lookups of `accounts.rs`
//! - The first failed upstream call aborts the operation; detail lookups
//!   fail per account
//! - Never log the provider URL, it embeds the API key

pub mod accounts;
pub mod address;
pub mod client;
pub mod holders;
pub mod signatures;
pub mod types;

pub use accounts::{TokenAccountSummary, TokenAccountsResult};
pub use address::{validate, PublicKey};
pub use client::RpcClient;
pub use holders::Holder;
pub use signatures::{ActivityOptions, DisplayZone, SignatureHistory, SignatureQuery};
pub use types::{BlockchainError, BlockchainResult};
