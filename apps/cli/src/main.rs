//! Ledgerbridge CLI: link remote bank accounts to a budgeting ledger and
//! sync their transactions.
//!
//! This binary is a thin shell around the `core` and `connect` crates:
//! it parses arguments, persists the JSON config (credentials, links,
//! watermark), wires the terminal prompts and runs the reconciler.

mod config;
mod prompt;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use config::Config;
use ledgerbridge_connect::linking::link_pass;
use ledgerbridge_connect::traits::{LedgerClient, RemoteSource};
use ledgerbridge_connect::{HttpLedgerClient, Reconciler, SimpleFinClient, SyncSettings};
use ledgerbridge_core::credentials::parse_access_key;
use ledgerbridge_core::watermark;

#[derive(Parser, Debug)]
#[command(name = "ledgerbridge", version, about)]
struct Args {
    /// Path to the configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Re-run the initial setup prompts
    #[arg(long)]
    setup: bool,

    /// Re-run account linking for all remote accounts
    #[arg(long)]
    link: bool,

    /// Directory used to stage downloaded budget data
    #[arg(long, default_value = "budgets")]
    staging_dir: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

/// Clear the budget staging directory so no stale state leaks between runs.
fn reset_staging_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to clear staging dir {}", dir.display()))?;
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create staging dir {}", dir.display()))?;
    Ok(())
}

fn ledger_client(config: &Config) -> Result<HttpLedgerClient> {
    let budget_password = if config.ledger.budget_password.is_empty() {
        None
    } else {
        Some(config.ledger.budget_password.clone())
    };
    Ok(HttpLedgerClient::new(
        &config.ledger.server_url,
        &config.ledger.server_password,
        &config.ledger.sync_id,
        budget_password,
    )?)
}

/// Verify the server settings end to end: the budget must download and
/// expose at least one account before linking makes sense.
async fn validate_server(config: &Config) -> Result<()> {
    let ledger = ledger_client(config)?;
    ledger.download_budget().await?;
    let accounts = ledger.get_accounts().await?;
    if accounts.is_empty() {
        bail!(
            "Check that the ledger server URL and sync id are correct and \
             that the budget has at least one account created"
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = Config::load(&args.config)?;

    if args.setup || config.setup_required() {
        prompt::initial_setup(&mut config).await?;
        validate_server(&config).await?;
        config.ledger.server_validated = true;
        config.save(&args.config)?;
    }

    let credential = parse_access_key(&config.simplefin.access_key)?;
    let remote = Arc::new(SimpleFinClient::new(credential)?);
    let ledger = Arc::new(ledger_client(&config)?);

    if args.link || config.linked_accounts.is_empty() {
        info!("Starting account linking");
        let remote_data = remote.fetch_accounts(None, None).await?;
        ledger.download_budget().await?;
        let ledger_accounts = ledger.get_accounts().await?;

        config.linked_accounts = link_pass(
            &remote_data.accounts,
            &ledger_accounts,
            &config.linked_accounts,
            args.link,
            &prompt::TerminalSelector,
        )
        .await?;
        config.save(&args.config)?;
    }

    let start_date = watermark::next_start_date(config.last_sync);
    reset_staging_dir(&args.staging_dir)?;

    let settings = SyncSettings {
        server_url: config.ledger.server_url.clone(),
        server_password: config.ledger.server_password.clone(),
        sync_id: config.ledger.sync_id.clone(),
        budget_password: if config.ledger.budget_password.is_empty() {
            None
        } else {
            Some(config.ledger.budget_password.clone())
        },
        annotate_balances: config.ledger.send_notes,
    };
    let reconciler = Reconciler::new(remote, ledger, settings);
    reconciler.run(&config.linked_accounts, start_date).await?;

    // The watermark only moves after a fully successful run.
    config.last_sync = Some(watermark::completed_watermark());
    config.save(&args.config)?;

    info!("Clearing temporary budget files");
    reset_staging_dir(&args.staging_dir)?;

    info!("Complete");
    Ok(())
}
