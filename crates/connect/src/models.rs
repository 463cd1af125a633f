//! Wire models for the remote aggregation API.
//!
//! These mirror the JSON returned by `GET {endpoint_base}/accounts`:
//! a set of accounts, each carrying its organization, a balance snapshot
//! and a nested transaction list. All of it is read-only to the bridge.

use serde::{Deserialize, Serialize};

/// Top-level `/accounts` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSet {
    #[serde(default)]
    pub accounts: Vec<RemoteAccount>,
}

impl AccountSet {
    /// Find an account by its remote id.
    pub fn account(&self, id: &str) -> Option<&RemoteAccount> {
        self.accounts.iter().find(|a| a.id == id)
    }
}

/// Organization (institution) owning a remote account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteOrg {
    #[serde(default)]
    pub name: String,
}

/// A bank account as reported by the remote source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteAccount {
    pub id: String,
    #[serde(default)]
    pub org: RemoteOrg,
    #[serde(default)]
    pub name: String,
    /// Decimal string balance, e.g. `"1234.56"`.
    #[serde(default)]
    pub balance: String,
    /// Epoch seconds of the balance snapshot.
    #[serde(rename = "balance-date", default)]
    pub balance_date: i64,
    #[serde(default)]
    pub transactions: Vec<RemoteTransaction>,
}

/// A transaction as reported by the remote source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteTransaction {
    pub id: String,
    /// Epoch seconds the transaction posted.
    pub posted: i64,
    /// Decimal string amount, dot-separated, no thousands separators.
    pub amount: String,
    #[serde(default)]
    pub payee: String,
    #[serde(default)]
    pub description: String,
}
