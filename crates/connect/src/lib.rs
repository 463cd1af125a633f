//! Ledgerbridge Connect - remote-source connectivity and reconciliation.
//!
//! This crate holds everything that talks to the network: the remote
//! aggregation API client, the ledger client trait and its HTTP
//! implementation, the account linker, the transaction normalizer and
//! the reconciliation driver.

pub mod client;
pub mod ledger_http;
pub mod linking;
pub mod mapping;
pub mod models;
pub mod reconcile;
pub mod report;
pub mod traits;

// Re-export commonly used types
pub use client::{claim_access_key, SimpleFinClient};
pub use ledger_http::HttpLedgerClient;
pub use linking::{candidate_choices, link_pass, AccountSelector, Choice};
pub use mapping::normalize;
pub use models::{AccountSet, RemoteAccount, RemoteOrg, RemoteTransaction};
pub use reconcile::{AccountImportSummary, Reconciler, RunSummary, SyncSettings};
pub use traits::{LedgerClient, RemoteSource};
