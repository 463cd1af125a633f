//! Models describing the budgeting ledger's import surface.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from remote account id to ledger account id.
///
/// Skipped accounts are never stored. The map's stable key order drives
/// the per-account import order, which keeps the printed report table
/// deterministic across runs.
pub type LinkMap = BTreeMap<String, String>;

/// An account as reported by the ledger service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub id: String,
    pub name: String,
}

/// A transaction in the ledger's import schema.
///
/// `imported_id` is the stable external identity the ledger keys its own
/// import dedup on; the bridge always supplies it and never attempts its
/// own deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    /// Ledger account id the transaction belongs to.
    pub account: String,
    /// ISO-8601 calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Amount in integer minor units (cents).
    pub amount: i64,
    pub payee_name: String,
    pub notes: String,
    /// Same string as `payee_name`; the ledger schema carries it twice.
    pub imported_payee: String,
    pub imported_id: String,
}

/// Result of a ledger import call, as reported by the ledger itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// Ids of transactions the ledger created.
    #[serde(default)]
    pub added: Vec<String>,
    /// Ids of transactions the ledger updated in place.
    #[serde(default)]
    pub updated: Vec<String>,
}
