//! Reconciliation driver: fetch, normalize, import, verify.
//!
//! One run walks `Init -> Fetching -> PerAccountImport -> ReDownloadVerify
//! -> Done`, strictly sequentially. There is no checkpointing and no
//! retry: a failure in any step aborts the whole run and propagates
//! unchanged, relying on the ledger's idempotent import (keyed by
//! `imported_id`) to make the next full re-run safe.

use chrono::{DateTime, NaiveDate};
use log::{error, info};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use crate::mapping;
use crate::report;
use crate::traits::{LedgerClient, RemoteSource};
use ledgerbridge_core::errors::{Error, Result};
use ledgerbridge_core::ledger::LinkMap;

/// Settings required before a run may start.
#[derive(Debug, Clone, Default)]
pub struct SyncSettings {
    /// Ledger server URL.
    pub server_url: String,
    /// Ledger server password.
    pub server_password: String,
    /// Budget sync id.
    pub sync_id: String,
    /// Budget encryption password, if the budget is encrypted.
    pub budget_password: Option<String>,
    /// Write a balance note to each linked account after import.
    pub annotate_balances: bool,
}

impl SyncSettings {
    /// Precondition check: a run never starts with missing server settings.
    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() || self.server_password.trim().is_empty() {
            return Err(Error::Configuration(
                "server URL or password not set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-account outcome of a run.
#[derive(Debug, Clone)]
pub struct AccountImportSummary {
    pub ledger_account_id: String,
    pub account_name: String,
    pub added: usize,
    pub updated: usize,
}

/// Outcome of one full reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub accounts: Vec<AccountImportSummary>,
}

/// Drives one reconciliation run end to end.
pub struct Reconciler {
    remote: Arc<dyn RemoteSource>,
    ledger: Arc<dyn LedgerClient>,
    settings: SyncSettings,
}

impl Reconciler {
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        ledger: Arc<dyn LedgerClient>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            remote,
            ledger,
            settings,
        }
    }

    /// Run one reconciliation pass over the given link map.
    ///
    /// `start_date` is the resolved incremental start bound; `None` on a
    /// first run leaves the window to the remote client's defaults.
    /// Prints the per-account report table to stdout and returns the
    /// same numbers as a [`RunSummary`].
    pub async fn run(&self, links: &LinkMap, start_date: Option<NaiveDate>) -> Result<RunSummary> {
        self.settings.validate()?;
        info!("Budget sync id: {}", self.settings.sync_id);

        info!("Downloading budget");
        self.ledger.download_budget().await.map_err(|e| {
            error!("Budget download failed: {}", e);
            e
        })?;
        info!("Budget downloaded");

        info!("Getting all accounts from the ledger");
        let ledger_accounts = self.ledger.get_accounts().await.map_err(|e| {
            error!("Fetching ledger accounts failed: {}", e);
            e
        })?;

        info!("Getting all transactions from the remote source");
        let remote_data = self
            .remote
            .fetch_transactions(start_date, None)
            .await
            .map_err(|e| {
                error!("Remote fetch failed: {}", e);
                e
            })?;

        let mut summary = RunSummary::default();
        println!("{}", report::header());

        for (remote_id, ledger_account_id) in links {
            let account = remote_data.account(remote_id).ok_or_else(|| {
                error!(
                    "Linked remote account '{}' missing from fetched data",
                    remote_id
                );
                Error::LinkIntegrity(remote_id.clone())
            })?;

            let transactions = account
                .transactions
                .iter()
                .map(|t| mapping::normalize(t, ledger_account_id))
                .collect::<Result<Vec<_>>>()?;

            let outcome = self
                .ledger
                .import_transactions(ledger_account_id, transactions)
                .await
                .map_err(|e| {
                    error!(
                        "Import failed for ledger account '{}': {}",
                        ledger_account_id, e
                    );
                    e
                })?;

            let account_name = ledger_accounts
                .iter()
                .find(|a| &a.id == ledger_account_id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| ledger_account_id.clone());

            println!(
                "{}",
                report::row(&account_name, outcome.added.len(), outcome.updated.len())
            );

            if self.settings.annotate_balances {
                let note = balance_note(account.balance_date, &account.balance);
                let note_id = format!("account-{}", ledger_account_id);
                self.ledger
                    .save_account_note(&note_id, &note)
                    .await
                    .map_err(|e| {
                        error!("Failed to write note '{}': {}", note_id, e);
                        e
                    })?;
            }

            summary.accounts.push(AccountImportSummary {
                ledger_account_id: ledger_account_id.clone(),
                account_name,
                added: outcome.added.len(),
                updated: outcome.updated.len(),
            });
        }

        println!("{}", report::footer());

        info!("Re-downloading budget to force sync");
        self.ledger.download_budget().await.map_err(|e| {
            error!("Budget re-download failed: {}", e);
            e
        })?;

        self.ledger.shutdown().await?;
        Ok(summary)
    }
}

/// Human-readable annotation for a linked account.
fn balance_note(balance_date: i64, balance: &str) -> String {
    let when = DateTime::from_timestamp(balance_date, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| balance_date.to_string());
    format!(
        "Transactions synced at {} with balance {}",
        when,
        format_usd(balance)
    )
}

/// Format a decimal string as USD currency, `$1,234.56` style.
fn format_usd(balance: &str) -> String {
    let Ok(value) = Decimal::from_str(balance) else {
        return format!("${}", balance);
    };
    let negative = value.is_sign_negative();
    let text = format!("{:.2}", value.abs().round_dp(2));
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-${}.{}", grouped, frac_part)
    } else {
        format!("${}.{}", grouped, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountSet, RemoteAccount, RemoteTransaction};
    use async_trait::async_trait;
    use ledgerbridge_core::ledger::{ImportOutcome, LedgerAccount, NormalizedTransaction};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn settings() -> SyncSettings {
        SyncSettings {
            server_url: "https://ledger.example.org".to_string(),
            server_password: "secret".to_string(),
            sync_id: "budget-1".to_string(),
            budget_password: None,
            annotate_balances: false,
        }
    }

    /// Remote source serving a fixed account set, windowed like the real
    /// server: transactions before the start bound are not returned.
    struct FakeRemote {
        data: AccountSet,
        fail: bool,
    }

    #[async_trait]
    impl RemoteSource for FakeRemote {
        async fn fetch_accounts(
            &self,
            start_date: Option<NaiveDate>,
            _end_date: Option<NaiveDate>,
        ) -> Result<AccountSet> {
            if self.fail {
                return Err(Error::RemoteFetch("connection refused".to_string()));
            }
            let mut data = self.data.clone();
            if let Some(start) = start_date {
                let cutoff = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
                for account in &mut data.accounts {
                    account.transactions.retain(|t| t.posted >= cutoff);
                }
            }
            Ok(data)
        }
    }

    /// Ledger that records every call and reports added/updated based on
    /// which imported ids it has already seen, mimicking the real dedup.
    #[derive(Default)]
    struct FakeLedger {
        accounts: Vec<LedgerAccount>,
        imports: Mutex<Vec<(String, Vec<NormalizedTransaction>)>>,
        seen_ids: Mutex<HashSet<String>>,
        notes: Mutex<Vec<(String, String)>>,
        downloads: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    #[async_trait]
    impl LedgerClient for FakeLedger {
        async fn download_budget(&self) -> Result<()> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn get_accounts(&self) -> Result<Vec<LedgerAccount>> {
            Ok(self.accounts.clone())
        }

        async fn import_transactions(
            &self,
            account_id: &str,
            transactions: Vec<NormalizedTransaction>,
        ) -> Result<ImportOutcome> {
            let mut seen = self.seen_ids.lock().unwrap();
            let mut outcome = ImportOutcome::default();
            for txn in &transactions {
                if seen.insert(txn.imported_id.clone()) {
                    outcome.added.push(txn.imported_id.clone());
                } else {
                    outcome.updated.push(txn.imported_id.clone());
                }
            }
            self.imports
                .lock()
                .unwrap()
                .push((account_id.to_string(), transactions));
            Ok(outcome)
        }

        async fn save_account_note(&self, note_id: &str, note: &str) -> Result<()> {
            self.notes
                .lock()
                .unwrap()
                .push((note_id.to_string(), note.to_string()));
            Ok(())
        }

        async fn shutdown(&self) -> Result<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn txn(id: &str, posted: i64, amount: &str) -> RemoteTransaction {
        RemoteTransaction {
            id: id.to_string(),
            posted,
            amount: amount.to_string(),
            payee: "Payee".to_string(),
            description: "desc".to_string(),
        }
    }

    fn scenario_data() -> AccountSet {
        AccountSet {
            accounts: vec![RemoteAccount {
                id: "a1".to_string(),
                name: "Checking".to_string(),
                balance: "1234.56".to_string(),
                balance_date: 1_717_977_600,
                transactions: vec![
                    // Before the 2024-06-01 window: excluded by the server.
                    txn("t0", 1_714_521_600, "-1.00"),
                    // Inside the window.
                    txn("t1", 1_717_977_600, "12.34"),
                    txn("t2", 1_718_064_000, "-5.00"),
                ],
                ..Default::default()
            }],
        }
    }

    fn links() -> LinkMap {
        [("a1".to_string(), "l1".to_string())].into_iter().collect()
    }

    fn ledger_with_account() -> FakeLedger {
        FakeLedger {
            accounts: vec![LedgerAccount {
                id: "l1".to_string(),
                name: "Checking".to_string(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_first_run_imports_in_window_transactions() {
        let remote = Arc::new(FakeRemote {
            data: scenario_data(),
            fail: false,
        });
        let ledger = Arc::new(ledger_with_account());
        let reconciler = Reconciler::new(remote, ledger.clone(), settings());

        let start = NaiveDate::from_ymd_opt(2024, 6, 1);
        let summary = reconciler.run(&links(), start).await.unwrap();

        let imports = ledger.imports.lock().unwrap();
        assert_eq!(imports.len(), 1);
        let (account_id, transactions) = &imports[0];
        assert_eq!(account_id, "l1");
        let ids: Vec<&str> = transactions.iter().map(|t| t.imported_id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(transactions[0].amount, 1234);
        assert_eq!(transactions[0].date, "2024-06-10");
        assert_eq!(transactions[1].amount, -500);

        assert_eq!(summary.accounts.len(), 1);
        assert_eq!(summary.accounts[0].account_name, "Checking");
        assert_eq!(summary.accounts[0].added, 2);
        assert_eq!(summary.accounts[0].updated, 0);

        // Initial download plus the unconditional re-download verify.
        assert_eq!(ledger.downloads.load(Ordering::SeqCst), 2);
        assert_eq!(ledger.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rerun_defers_dedup_to_the_ledger() {
        let remote = Arc::new(FakeRemote {
            data: scenario_data(),
            fail: false,
        });
        let ledger = Arc::new(ledger_with_account());
        let reconciler = Reconciler::new(remote, ledger.clone(), settings());
        let start = NaiveDate::from_ymd_opt(2024, 6, 1);

        let first = reconciler.run(&links(), start).await.unwrap();
        let second = reconciler.run(&links(), start).await.unwrap();

        assert_eq!(first.accounts[0].added, 2);
        assert_eq!(second.accounts[0].added, 0);
        assert_eq!(second.accounts[0].updated, 2);

        // Both runs pushed the full set; the driver filtered nothing.
        let imports = ledger.imports.lock().unwrap();
        assert_eq!(imports[0].1.len(), 2);
        assert_eq!(imports[1].1.len(), 2);
    }

    #[tokio::test]
    async fn test_annotation_writes_balance_note() {
        let remote = Arc::new(FakeRemote {
            data: scenario_data(),
            fail: false,
        });
        let ledger = Arc::new(ledger_with_account());
        let mut annotated = settings();
        annotated.annotate_balances = true;
        let reconciler = Reconciler::new(remote, ledger.clone(), annotated);

        reconciler
            .run(&links(), NaiveDate::from_ymd_opt(2024, 6, 1))
            .await
            .unwrap();

        let notes = ledger.notes.lock().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].0, "account-l1");
        assert_eq!(
            notes[0].1,
            "Transactions synced at 2024-06-10 00:00:00 with balance $1,234.56"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_original_error() {
        let remote = Arc::new(FakeRemote {
            data: AccountSet::default(),
            fail: true,
        });
        let ledger = Arc::new(ledger_with_account());
        let reconciler = Reconciler::new(remote, ledger.clone(), settings());

        let err = reconciler.run(&links(), None).await.unwrap_err();
        assert!(matches!(err, Error::RemoteFetch(_)));
        assert!(ledger.imports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_vanished_remote_account_is_a_link_integrity_error() {
        let remote = Arc::new(FakeRemote {
            data: AccountSet::default(),
            fail: false,
        });
        let ledger = Arc::new(ledger_with_account());
        let reconciler = Reconciler::new(remote, ledger, settings());

        let err = reconciler
            .run(&links(), NaiveDate::from_ymd_opt(2024, 6, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LinkIntegrity(id) if id == "a1"));
    }

    #[tokio::test]
    async fn test_missing_configuration_fails_before_any_call() {
        let remote = Arc::new(FakeRemote {
            data: scenario_data(),
            fail: false,
        });
        let ledger = Arc::new(ledger_with_account());
        let mut incomplete = settings();
        incomplete.server_password = String::new();
        let reconciler = Reconciler::new(remote, ledger.clone(), incomplete);

        let err = reconciler.run(&links(), None).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(ledger.downloads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd("1234.56"), "$1,234.56");
        assert_eq!(format_usd("-500.00"), "-$500.00");
        assert_eq!(format_usd("0.05"), "$0.05");
        assert_eq!(format_usd("1000000.00"), "$1,000,000.00");
    }
}
