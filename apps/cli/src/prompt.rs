//! Terminal prompts: initial setup and account-link selection.

use anyhow::Result;
use async_trait::async_trait;
use dialoguer::{Confirm, Input, Select};

use crate::config::Config;
use ledgerbridge_connect::claim_access_key;
use ledgerbridge_connect::linking::{AccountSelector, Choice};
use ledgerbridge_connect::models::RemoteAccount;
use ledgerbridge_core::{Error, Result as CoreResult};

/// Link selector backed by an interactive terminal menu.
pub struct TerminalSelector;

#[async_trait]
impl AccountSelector for TerminalSelector {
    async fn select(
        &self,
        remote: &RemoteAccount,
        choices: &[Choice],
        default: Option<&str>,
    ) -> CoreResult<Option<String>> {
        let labels: Vec<&str> = choices.iter().map(|c| c.name.as_str()).collect();
        let default_index = default
            .and_then(|d| choices.iter().position(|c| c.value.as_deref() == Some(d)))
            .unwrap_or(0);

        let prompt = format!(
            "Link {} - {} (${}) with ledger account",
            remote.org.name, remote.name, remote.balance
        );
        let picked = Select::new()
            .with_prompt(prompt)
            .items(&labels)
            .default(default_index)
            .interact()
            .map_err(|e| Error::Unexpected(format!("Selection prompt failed: {}", e)))?;

        Ok(choices[picked].value.clone())
    }
}

/// Walk the user through the initial setup and update `config` in place.
///
/// A changed (or first-time) setup token is claimed immediately so an
/// invalid token surfaces here instead of on the first sync.
pub async fn initial_setup(config: &mut Config) -> Result<()> {
    println!("Initiating setup...");

    let token: String = Input::new()
        .with_prompt("SimpleFIN setup token")
        .default(config.simplefin.token.clone())
        .allow_empty(true)
        .interact_text()?;
    if !token.is_empty() && (token != config.simplefin.token || config.simplefin.access_key.is_empty())
    {
        config.simplefin.access_key = claim_access_key(&token).await?;
        config.simplefin.token = token;
    }

    config.ledger.server_url = Input::new()
        .with_prompt("Ledger server URL")
        .default(config.ledger.server_url.clone())
        .interact_text()?;
    config.ledger.server_password = Input::new()
        .with_prompt("Ledger server password")
        .default(config.ledger.server_password.clone())
        .interact_text()?;
    config.ledger.sync_id = Input::new()
        .with_prompt("Budget sync id")
        .default(config.ledger.sync_id.clone())
        .interact_text()?;
    config.ledger.budget_password = Input::new()
        .with_prompt("Budget encryption password (leave blank if not encrypted)")
        .default(config.ledger.budget_password.clone())
        .allow_empty(true)
        .interact_text()?;
    config.ledger.send_notes = Confirm::new()
        .with_prompt("Overwrite linked account notes with date and balance each run?")
        .default(config.ledger.send_notes)
        .interact()?;

    Ok(())
}
