//! Mapping remote transactions into the ledger import schema.
//!
//! Conversions are explicit: the posted timestamp becomes a UTC calendar
//! date, and the decimal amount string becomes integer minor units. The
//! remote source's contract is exactly two fractional digits; an amount
//! with any other precision would silently corrupt the minor-unit
//! conversion, so it is rejected outright instead of rescaled.

use chrono::DateTime;
use regex::Regex;
use std::sync::OnceLock;

use crate::models::RemoteTransaction;
use ledgerbridge_core::ledger::NormalizedTransaction;
use ledgerbridge_core::errors::{Error, Result};

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?\d+\.\d{2}$").expect("valid amount pattern"))
}

/// Convert a two-decimal amount string into integer minor units.
///
/// `"12.34"` becomes `1234`, `"-5.00"` becomes `-500`.
pub fn amount_minor_units(amount: &str) -> Result<i64> {
    if !amount_pattern().is_match(amount) {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    amount
        .replace('.', "")
        .parse::<i64>()
        .map_err(|_| Error::InvalidAmount(amount.to_string()))
}

/// UTC calendar date (`YYYY-MM-DD`) of an epoch-seconds timestamp.
pub fn posted_date(epoch_seconds: i64) -> String {
    DateTime::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Map one remote transaction into the ledger import schema.
pub fn normalize(txn: &RemoteTransaction, ledger_account_id: &str) -> Result<NormalizedTransaction> {
    Ok(NormalizedTransaction {
        account: ledger_account_id.to_string(),
        date: posted_date(txn.posted),
        amount: amount_minor_units(&txn.amount)?,
        payee_name: txn.payee.clone(),
        notes: txn.description.clone(),
        imported_payee: txn.payee.clone(),
        imported_id: txn.id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_minor_units() {
        assert_eq!(amount_minor_units("12.34").unwrap(), 1234);
        assert_eq!(amount_minor_units("-5.00").unwrap(), -500);
        assert_eq!(amount_minor_units("0.01").unwrap(), 1);
        assert_eq!(amount_minor_units("1000000.00").unwrap(), 100_000_000);
    }

    #[test]
    fn test_amount_minor_units_rejects_other_precisions() {
        for bad in ["1.5", "1.500", "1", "1.", ".50", "1,000.00", "12.3a", ""] {
            assert!(
                matches!(amount_minor_units(bad), Err(Error::InvalidAmount(_))),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_posted_date_is_utc_calendar_date() {
        // 2024-06-10T00:00:00Z
        assert_eq!(posted_date(1_717_977_600), "2024-06-10");
        // One second before midnight stays on the previous UTC day.
        assert_eq!(posted_date(1_717_977_599), "2024-06-09");
    }

    #[test]
    fn test_normalize() {
        let txn = RemoteTransaction {
            id: "t-1".to_string(),
            posted: 1_717_977_600,
            amount: "-5.00".to_string(),
            payee: "Grocer".to_string(),
            description: "weekly shop".to_string(),
        };
        let normalized = normalize(&txn, "l1").unwrap();

        assert_eq!(normalized.account, "l1");
        assert_eq!(normalized.date, "2024-06-10");
        assert_eq!(normalized.amount, -500);
        assert_eq!(normalized.payee_name, "Grocer");
        assert_eq!(normalized.imported_payee, "Grocer");
        assert_eq!(normalized.notes, "weekly shop");
        assert_eq!(normalized.imported_id, "t-1");
    }

    #[test]
    fn test_normalize_rejects_bad_amount() {
        let txn = RemoteTransaction {
            id: "t-1".to_string(),
            posted: 1_717_977_600,
            amount: "12.345".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            normalize(&txn, "l1"),
            Err(Error::InvalidAmount(_))
        ));
    }
}
