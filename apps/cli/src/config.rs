//! JSON configuration file: credentials, ledger settings, links, watermark.
//!
//! The core crates read these as plain values and hand back updated ones;
//! persisting them is this shell's job alone.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use ledgerbridge_core::ledger::LinkMap;

/// Remote-source credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimpleFinSection {
    /// The base64 setup token the access key was claimed from.
    pub token: String,
    /// Composite access credential string (`scheme//user:pass@host`).
    pub access_key: String,
}

/// Budgeting ledger settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerSection {
    pub server_url: String,
    pub server_password: String,
    pub sync_id: String,
    /// Budget encryption password; empty when the budget is unencrypted.
    pub budget_password: String,
    /// Overwrite each linked account's note with date and balance per run.
    pub send_notes: bool,
    /// Set once the server settings have been verified end to end.
    pub server_validated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub simplefin: SimpleFinSection,
    pub ledger: LedgerSection,
    pub linked_accounts: LinkMap,
    /// Date of the last successful run; drives the incremental window.
    pub last_sync: Option<NaiveDate>,
}

impl Config {
    /// Load the config file, or defaults if it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Config file {} is not valid JSON", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// True when any setting required for a run is still missing.
    pub fn setup_required(&self) -> bool {
        self.simplefin.access_key.is_empty()
            || self.ledger.sync_id.is_empty()
            || self.ledger.server_url.is_empty()
            || self.ledger.server_password.is_empty()
            || !self.ledger.server_validated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();
        assert!(config.setup_required());
        assert!(config.linked_accounts.is_empty());
        assert!(config.last_sync.is_none());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.simplefin.access_key = "https://u:p@h".to_string();
        config.ledger.server_url = "https://ledger.example.org".to_string();
        config.ledger.server_password = "pw".to_string();
        config.ledger.sync_id = "budget-1".to_string();
        config.ledger.server_validated = true;
        config
            .linked_accounts
            .insert("r1".to_string(), "l1".to_string());
        config.last_sync = NaiveDate::from_ymd_opt(2024, 6, 10);

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert!(!loaded.setup_required());
        assert_eq!(loaded.linked_accounts.get("r1").map(String::as_str), Some("l1"));
        assert_eq!(loaded.last_sync, NaiveDate::from_ymd_opt(2024, 6, 10));
    }

    #[test]
    fn test_partial_config_needs_setup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"ledger": {"serverUrl": "https://x"}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.ledger.server_url, "https://x");
        assert!(config.setup_required());
    }
}
