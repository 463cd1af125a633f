//! Ledgerbridge Core - Domain entities and conversion logic.
//!
//! This crate contains the transport-agnostic pieces of the bridge:
//! the error taxonomy, the access-credential codec, the ledger-side
//! import models and the incremental sync watermark. Everything that
//! talks to the network lives in the `connect` crate.

pub mod credentials;
pub mod errors;
pub mod ledger;
pub mod watermark;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
