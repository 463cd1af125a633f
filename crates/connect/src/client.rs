//! HTTP client for the remote aggregation API.
//!
//! Issues authenticated requests against a SimpleFIN-style endpoint:
//! `GET {endpoint_base}/accounts` with HTTP Basic auth and optional
//! epoch-second date bounds, plus the one-time credential claim POST.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::header::CONTENT_LENGTH;
use std::time::Duration;

use crate::models::AccountSet;
use crate::traits::RemoteSource;
use ledgerbridge_core::credentials::{decode_setup_token, AccessCredential};
use ledgerbridge_core::errors::{Error, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for a SimpleFIN-style bank aggregation endpoint.
///
/// Holds the parsed access credential; every request authenticates with
/// HTTP Basic auth built from its username/password pair.
#[derive(Debug, Clone)]
pub struct SimpleFinClient {
    client: reqwest::Client,
    credential: AccessCredential,
}

impl SimpleFinClient {
    /// Create a new client for the given credential.
    pub fn new(credential: AccessCredential) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self { client, credential })
    }

    /// Epoch seconds of UTC midnight for a calendar date, the form the
    /// remote API expects for its `start-date`/`end-date` bounds.
    fn date_param(date: NaiveDate) -> i64 {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default()
    }

    /// Build the `/accounts` URL with any requested date bounds.
    fn accounts_url(&self, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> String {
        let mut url = format!("{}/accounts", self.credential.endpoint_base);

        let mut params = Vec::new();
        if let Some(d) = start_date {
            params.push(format!("start-date={}", Self::date_param(d)));
        }
        if let Some(d) = end_date {
            params.push(format!("end-date={}", Self::date_param(d)));
        }
        if !params.is_empty() {
            url = format!("{}?{}", url, params.join("&"));
        }
        url
    }
}

#[async_trait]
impl RemoteSource for SimpleFinClient {
    async fn fetch_accounts(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<AccountSet> {
        let url = self.accounts_url(start_date, end_date);
        debug!("[SimpleFin] GET {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.credential.username, Some(&self.credential.password))
            .send()
            .await
            .map_err(|e| Error::RemoteFetch(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::RemoteFetch(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::RemoteFetch(format!(
                "API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let set: AccountSet = serde_json::from_str(&body)
            .map_err(|e| Error::RemoteFetch(format!("Failed to parse response: {}", e)))?;

        info!("[SimpleFin] Fetched {} remote accounts", set.accounts.len());
        Ok(set)
    }
}

/// Claim an access credential string from a one-time setup token.
///
/// Decodes the token into its claim URL and POSTs to it with an empty
/// body (`Content-Length: 0`). The response body text is the composite
/// access credential.
pub async fn claim_access_key(token: &str) -> Result<String> {
    let claim_url = decode_setup_token(token)?;
    info!("[SimpleFin] Claiming access credential from setup token");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

    let response = client
        .post(claim_url)
        .header(CONTENT_LENGTH, 0)
        .send()
        .await
        .map_err(|e| Error::Claim(format!("Claim request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Claim(format!("Failed to read claim response: {}", e)))?;

    if !status.is_success() {
        return Err(Error::Claim(format!(
            "Claim endpoint returned {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        )));
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> SimpleFinClient {
        SimpleFinClient::new(AccessCredential {
            endpoint_base: "https://bridge.example.org/simplefin".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_date_param_is_utc_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(SimpleFinClient::date_param(date), 1_704_067_200);
    }

    #[test]
    fn test_accounts_url_without_bounds() {
        let client = test_client();
        assert_eq!(
            client.accounts_url(None, None),
            "https://bridge.example.org/simplefin/accounts"
        );
    }

    #[test]
    fn test_accounts_url_with_bounds() {
        let client = test_client();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(
            client.accounts_url(Some(start), Some(end)),
            "https://bridge.example.org/simplefin/accounts?start-date=1704067200&end-date=1706745600"
        );
    }

    #[test]
    fn test_accounts_url_start_only() {
        let client = test_client();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            client.accounts_url(Some(start), None),
            "https://bridge.example.org/simplefin/accounts?start-date=1704067200"
        );
    }
}
