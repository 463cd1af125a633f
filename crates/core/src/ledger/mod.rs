//! Ledger-side domain models.

mod ledger_model;

pub use ledger_model::{ImportOutcome, LedgerAccount, LinkMap, NormalizedTransaction};
