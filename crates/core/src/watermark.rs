//! Incremental sync watermark.
//!
//! The caller persists the date of the last successful run; the next run
//! starts a fixed number of days before it to absorb transactions that
//! post with a delay after their stated date.

use chrono::{Days, Local, NaiveDate};

/// Calendar days the next fetch reaches back past the last successful run.
pub const SYNC_LOOKBACK_DAYS: u64 = 5;

/// Compute the start date for the next incremental fetch.
///
/// `None` means no prior run is recorded and the full available history
/// should be fetched (no start bound).
pub fn next_start_date(last_run: Option<NaiveDate>) -> Option<NaiveDate> {
    last_run.map(|date| date - Days::new(SYNC_LOOKBACK_DAYS))
}

/// The watermark recorded after a successful run: today's calendar date,
/// regardless of how far back the run fetched. Intentionally coarse;
/// several runs on the same day all record the same date.
pub fn completed_watermark() -> NaiveDate {
    Local::now().date_naive()
}
