//! Core error types for the ledgerbridge crates.
//!
//! Every failure in the bridge surfaces as one of these variants, is
//! logged with context at the point it occurs, and is re-thrown
//! unchanged to the top-level caller. There is no local recovery,
//! partial commit, or automatic retry anywhere in the core.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the bridge.
#[derive(Error, Debug)]
pub enum Error {
    /// The composite access credential string did not have the expected
    /// `scheme//user:pass@host` shape.
    #[error("Malformed access credential: {0}")]
    MalformedCredential(String),

    /// The base64 setup token did not decode to a claim URL.
    #[error("Invalid setup token: {0}")]
    InvalidToken(String),

    /// Claiming an access credential from the setup token failed.
    #[error("Failed to claim access credential: {0}")]
    Claim(String),

    /// Transport or parse failure talking to the remote data source.
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    /// Required endpoint/secret settings were missing before a run.
    #[error("Missing or invalid configuration: {0}")]
    Configuration(String),

    /// A linked remote account vanished from the latest fetch.
    #[error("Linked remote account '{0}' is no longer present in the fetched data")]
    LinkIntegrity(String),

    /// A transaction amount did not carry exactly two fractional digits.
    #[error("Transaction amount '{0}' does not have exactly two decimal places")]
    InvalidAmount(String),

    /// Any failure surfaced by the ledger collaborator.
    #[error("Ledger service operation failed: {0}")]
    LedgerService(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
