//! Cell-level parsing: bond identifiers, report dates and amounts.

use bond_core::{Amount, Error, Result};
use chrono::NaiveDate;

/// Date format used by the published reports, e.g. `12/Apr/2019`.
pub const REPORT_DATE_FORMAT: &str = "%d/%b/%Y";

/// Largest accepted amount. Per-name totals are summed in `Amount`, so a
/// bound per cell keeps those sums far from `i64::MAX`.
pub const MAX_AMOUNT: Amount = 1_000_000_000_000;

/// Derive the bond identifier `{prefix}-{bond_number}`.
pub fn bond_id(prefix: &str, bond_number: &str) -> String {
    format!("{}-{}", prefix.trim(), bond_number.trim())
}

/// Parse a report date. `row` and `column` are only used for error context.
///
/// The year must be exactly four digits; `%Y` alone would take `19` as year 19.
pub fn parse_date(value: &str, row: usize, column: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    let year = trimmed.rsplit('/').next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::malformed_date(row, column, value));
    }
    NaiveDate::parse_from_str(trimmed, REPORT_DATE_FORMAT)
        .map_err(|_| Error::malformed_date(row, column, value))
}

/// Parse an amount like `1,00,00,000` into minor units.
pub fn parse_amount(value: &str, row: usize, column: &str) -> Result<Amount> {
    let digits: String = value
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::malformed_amount(row, column, value));
    }
    digits
        .parse::<Amount>()
        .ok()
        .filter(|amount| *amount <= MAX_AMOUNT)
        .ok_or_else(|| Error::malformed_amount(row, column, value))
}
