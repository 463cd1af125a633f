//! Fixed-width report table for per-account import results.
//!
//! One header block, one row per linked account, one closing overline.
//! Kept as pure string helpers so the exact widths stay pinned by tests.

/// Width of the account-name column.
const NAME_WIDTH: usize = 25;
/// Width of the added/updated count columns.
const COUNT_WIDTH: usize = 9;

/// Top border plus column headings.
pub fn header() -> String {
    [
        "_____________________________________________________",
        "|          Account          |   Added   |  Updated  |",
        "+---------------------------+-----------+-----------+",
    ]
    .join("\n")
}

/// One body row: name left-justified to 25, counts right-justified to 9.
pub fn row(account_name: &str, added: usize, updated: usize) -> String {
    format!(
        "| {:<name_w$} | {:>count_w$} | {:>count_w$} |",
        account_name,
        added,
        updated,
        name_w = NAME_WIDTH,
        count_w = COUNT_WIDTH,
    )
}

/// Closing overline.
pub fn footer() -> String {
    "\u{af}".repeat(53)
}
