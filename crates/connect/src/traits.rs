//! Traits defining the seams to the remote source and the ledger service.

use async_trait::async_trait;
use chrono::{Datelike, Local, Months, NaiveDate};

use crate::models::AccountSet;
use ledgerbridge_core::ledger::{ImportOutcome, LedgerAccount, NormalizedTransaction};
use ledgerbridge_core::Result;

/// Read-only access to the remote aggregation API.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch accounts with nested transactions for the given date window.
    ///
    /// An absent bound is omitted from the request entirely, so the
    /// server's own defaults apply.
    async fn fetch_accounts(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<AccountSet>;

    /// Like [`fetch_accounts`](RemoteSource::fetch_accounts), but when
    /// neither bound is given defaults to the current calendar month:
    /// `[first day of this month, first day of next month)`.
    ///
    /// A lone start bound is passed through as-is and leaves the end
    /// open; the month default only kicks in when both are absent.
    async fn fetch_transactions(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<AccountSet> {
        if start_date.is_none() && end_date.is_none() {
            let today = Local::now().date_naive();
            let month_start = today.with_day(1).unwrap_or(today);
            let next_month_start = month_start + Months::new(1);
            log::info!(
                "No window given; fetching {} - {}",
                month_start,
                next_month_start
            );
            return self
                .fetch_accounts(Some(month_start), Some(next_month_start))
                .await;
        }
        self.fetch_accounts(start_date, end_date).await
    }
}

/// The budgeting ledger, treated as an opaque remote collaborator.
///
/// Every method is a network/IPC call that may fail; none of them are
/// retried by the bridge.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Force the ledger to (re)download its budget state.
    async fn download_budget(&self) -> Result<()>;

    /// All accounts known to the ledger.
    async fn get_accounts(&self) -> Result<Vec<LedgerAccount>>;

    /// Import transactions into one ledger account.
    ///
    /// Deduplication is the ledger's own contract, keyed by
    /// `imported_id`; the bridge passes every fetched transaction through.
    async fn import_transactions(
        &self,
        account_id: &str,
        transactions: Vec<NormalizedTransaction>,
    ) -> Result<ImportOutcome>;

    /// Write a per-account note, keyed by a note id string.
    async fn save_account_note(&self, note_id: &str, note: &str) -> Result<()>;

    /// Release the ledger session.
    async fn shutdown(&self) -> Result<()>;
}
