//! HTTP implementation of the ledger client.
//!
//! Talks to a sidecar REST API in front of the budgeting ledger. The
//! bridge itself only depends on the [`LedgerClient`] trait; this is the
//! one wiring of it that ships with the binary.

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use crate::traits::LedgerClient;
use ledgerbridge_core::errors::{Error, Result};
use ledgerbridge_core::ledger::{ImportOutcome, LedgerAccount, NormalizedTransaction};

/// Default timeout for ledger requests. Budget downloads can be slow.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Header carrying the ledger server password.
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, serde::Deserialize)]
struct ApiAccountsResponse {
    #[serde(default)]
    accounts: Vec<LedgerAccount>,
}

/// Client for a ledger sidecar REST API.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    client: reqwest::Client,
    base_url: String,
    server_password: String,
    sync_id: String,
    budget_password: Option<String>,
}

impl HttpLedgerClient {
    pub fn new(
        server_url: &str,
        server_password: &str,
        sync_id: &str,
        budget_password: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: server_url.trim_end_matches('/').to_string(),
            server_password: server_password.to_string(),
            sync_id: sync_id.to_string(),
            budget_password,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/budgets/{}{}", self.base_url, self.sync_id, path)
    }

    /// POST a JSON body and parse the JSON response.
    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let url = self.url(path);
        debug!("[Ledger] POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.server_password)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::LedgerService(format!("Request failed: {}", e)))?;

        Self::parse_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("[Ledger] GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.server_password)
            .send()
            .await
            .map_err(|e| Error::LedgerService(format!("Request failed: {}", e)))?;

        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::LedgerService(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::LedgerService(format!(
                "API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::LedgerService(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn download_budget(&self) -> Result<()> {
        let body = match &self.budget_password {
            Some(password) => json!({ "password": password }),
            None => json!({}),
        };
        let _: serde_json::Value = self.post("/download", body).await?;
        Ok(())
    }

    async fn get_accounts(&self) -> Result<Vec<LedgerAccount>> {
        let response: ApiAccountsResponse = self.get("/accounts").await?;
        Ok(response.accounts)
    }

    async fn import_transactions(
        &self,
        account_id: &str,
        transactions: Vec<NormalizedTransaction>,
    ) -> Result<ImportOutcome> {
        let path = format!("/accounts/{}/transactions/import", account_id);
        self.post(&path, json!({ "transactions": transactions }))
            .await
    }

    async fn save_account_note(&self, note_id: &str, note: &str) -> Result<()> {
        let path = format!("/notes/{}", note_id);
        let _: serde_json::Value = self.post(&path, json!({ "note": note })).await?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        // Stateless transport; nothing to release on the client side.
        debug!("[Ledger] Session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building_and_normalization() {
        let client =
            HttpLedgerClient::new("https://ledger.example.org/", "pw", "budget-1", None).unwrap();
        assert_eq!(
            client.url("/accounts"),
            "https://ledger.example.org/v1/budgets/budget-1/accounts"
        );
    }
}
