//! CSV readers for the purchase and redemption reports.
//!
//! Rows are deserialized by header name, so column order does not matter but
//! every required column must be present. Any malformed cell aborts the read.

use crate::parse::{bond_id, parse_amount, parse_date};
use bond_core::{Error, PurchaseRecord, RedemptionRecord, Result, Side};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Raw purchase row as it appears in the report.
#[derive(Debug, Deserialize)]
struct PurchaseRow {
    #[serde(rename = "Sr No.", default)]
    serial: Option<String>,
    #[serde(rename = "Reference No (URN)")]
    urn: String,
    #[serde(rename = "Journal Date")]
    journal_date: String,
    #[serde(rename = "Date of Purchase")]
    purchase_date: String,
    #[serde(rename = "Date of Expiry")]
    expiry_date: String,
    #[serde(rename = "Name of the Purchaser")]
    purchaser_name: String,
    #[serde(rename = "Prefix")]
    prefix: String,
    #[serde(rename = "Bond Number")]
    bond_number: String,
    #[serde(rename = "Denominations")]
    denominations: String,
    #[serde(rename = "Issue Branch Code")]
    branch_code: String,
    #[serde(rename = "Issue Teller")]
    branch_teller: String,
    #[serde(rename = "Status")]
    status: String,
}

/// Raw redemption row as it appears in the report.
#[derive(Debug, Deserialize)]
struct RedemptionRow {
    #[serde(rename = "Sr No.", default)]
    serial: Option<String>,
    #[serde(rename = "Date of Encashment")]
    encashment_date: String,
    #[serde(rename = "Name of the Political Party")]
    party_name: String,
    #[serde(rename = "Account no. of Political Party")]
    party_account_no: String,
    #[serde(rename = "Prefix")]
    prefix: String,
    #[serde(rename = "Bond Number")]
    bond_number: String,
    #[serde(rename = "Denominations")]
    denominations: String,
    #[serde(rename = "Pay Branch Code")]
    branch_code: String,
    #[serde(rename = "Pay Teller")]
    branch_teller: String,
}

/// Serial number from `Sr No.`, falling back to the row position.
///
/// Serials are stored as SQLite integers, so anything above `i64::MAX` is rejected.
fn serial(raw: Option<&str>, row: usize) -> Result<u64> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse::<u64>()
            .ok()
            .filter(|n| i64::try_from(*n).is_ok())
            .ok_or_else(|| Error::input(format!("row {row}: invalid 'Sr No.' value '{s}'"))),
        None => Ok(row as u64),
    }
}

impl PurchaseRow {
    fn into_record(self, row: usize) -> Result<PurchaseRecord> {
        Ok(PurchaseRecord {
            id: serial(self.serial.as_deref(), row)?,
            urn: self.urn,
            journal_date: parse_date(&self.journal_date, row, "Journal Date")?,
            purchase_date: parse_date(&self.purchase_date, row, "Date of Purchase")?,
            expiry_date: parse_date(&self.expiry_date, row, "Date of Expiry")?,
            purchaser_name: self.purchaser_name,
            bond_id: bond_id(&self.prefix, &self.bond_number),
            amount: parse_amount(&self.denominations, row, "Denominations")?,
            branch_code: self.branch_code,
            branch_teller: self.branch_teller,
            status: self.status,
        })
    }
}

impl RedemptionRow {
    fn into_record(self, row: usize) -> Result<RedemptionRecord> {
        Ok(RedemptionRecord {
            id: serial(self.serial.as_deref(), row)?,
            encashment_date: parse_date(&self.encashment_date, row, "Date of Encashment")?,
            party_name: self.party_name,
            party_account_no: self.party_account_no,
            bond_id: bond_id(&self.prefix, &self.bond_number),
            amount: parse_amount(&self.denominations, row, "Denominations")?,
            branch_code: self.branch_code,
            branch_teller: self.branch_teller,
        })
    }
}

/// Deserialize every row of `reader` and convert it, stopping at the first failure.
fn read_rows<R, T, U, F>(reader: R, side: Side, convert: F) -> Result<Vec<U>>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
    F: Fn(T, usize) -> Result<U>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, raw) in csv_reader.deserialize::<T>().enumerate() {
        let row = i + 1;
        let raw = raw.map_err(|e| Error::input(format!("{side} row {row}: {e}")))?;
        records.push(convert(raw, row)?);
    }
    debug!(%side, rows = records.len(), "rows parsed");
    Ok(records)
}

/// Read purchase records from CSV, preserving row order.
pub fn read_purchases<R: Read>(reader: R) -> Result<Vec<PurchaseRecord>> {
    read_rows(reader, Side::Purchase, PurchaseRow::into_record)
}

/// Read redemption records from CSV, preserving row order.
pub fn read_redemptions<R: Read>(reader: R) -> Result<Vec<RedemptionRecord>> {
    read_rows(reader, Side::Redemption, RedemptionRow::into_record)
}

/// Read purchase records from a CSV file.
pub fn read_purchases_path(path: impl AsRef<Path>) -> Result<Vec<PurchaseRecord>> {
    read_purchases(File::open(path)?)
}

/// Read redemption records from a CSV file.
pub fn read_redemptions_path(path: impl AsRef<Path>) -> Result<Vec<RedemptionRecord>> {
    read_redemptions(File::open(path)?)
}

/// Both record sequences of one ingestion batch.
#[derive(Debug, Clone, Default)]
pub struct IngestBatch {
    pub purchases: Vec<PurchaseRecord>,
    pub redemptions: Vec<RedemptionRecord>,
}

/// Row counts of an ingestion batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    pub purchase_rows: usize,
    pub redemption_rows: usize,
}

impl IngestBatch {
    /// Read both reports from disk.
    pub fn from_paths(purchases: impl AsRef<Path>, redemptions: impl AsRef<Path>) -> Result<Self> {
        let batch = Self {
            purchases: read_purchases_path(purchases)?,
            redemptions: read_redemptions_path(redemptions)?,
        };
        let report = batch.report();
        info!(
            purchase_rows = report.purchase_rows,
            redemption_rows = report.redemption_rows,
            "ingestion batch read"
        );
        Ok(batch)
    }

    /// Row counts.
    pub fn report(&self) -> IngestReport {
        IngestReport {
            purchase_rows: self.purchases.len(),
            redemption_rows: self.redemptions.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const PURCHASE_HEADER: &str = "Sr No.,Reference No (URN),Journal Date,Date of Purchase,Date of Expiry,Name of the Purchaser,Prefix,Bond Number,Denominations,Issue Branch Code,Issue Teller,Status";
    const REDEMPTION_HEADER: &str = "Sr No.,Date of Encashment,Name of the Political Party,Account no. of Political Party,Prefix,Bond Number,Denominations,Pay Branch Code,Pay Teller";

    #[test]
    fn test_read_purchases() {
        let csv = format!(
            "{PURCHASE_HEADER}\n\
             1,00001201904120000001166,12/Apr/2019,12/Apr/2019,26/Apr/2019,A B C INDIA LIMITED,TL,11448,\"10,000\",1,12,Active\n\
             2,00001201904120000001166,12/Apr/2019,12/Apr/2019,26/Apr/2019,A B C INDIA LIMITED,TL,11447,\"1,00,000\",1,12,Expired\n"
        );
        let records = read_purchases(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].bond_id, "TL-11448");
        assert_eq!(records[0].amount, 10_000);
        assert_eq!(records[0].purchase_date, NaiveDate::from_ymd_opt(2019, 4, 12).unwrap());
        assert_eq!(records[0].expiry_date, NaiveDate::from_ymd_opt(2019, 4, 26).unwrap());
        assert_eq!(records[1].bond_id, "TL-11447");
        assert_eq!(records[1].amount, 100_000);
        assert_eq!(records[1].status, "Expired");
    }

    #[test]
    fn test_read_redemptions_without_serial_uses_row_position() {
        let csv = "Date of Encashment,Name of the Political Party,Account no. of Political Party,Prefix,Bond Number,Denominations,Pay Branch Code,Pay Teller\n\
                   12/Apr/2019,PARTY ONE,*******5199,OC,775,\"1,00,00,000\",00800,2770121\n\
                   13/Apr/2019,PARTY TWO,*******1234,OC,776,\"10,000\",00800,2770121\n";
        let records = read_redemptions(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[1].id, 2);
        assert_eq!(records[0].bond_id, "OC-775");
        assert_eq!(records[0].amount, 10_000_000);
        assert_eq!(records[0].branch_code, "00800");
        assert_eq!(records[1].party_name, "PARTY TWO");
    }

    #[test]
    fn test_malformed_date_aborts_batch() {
        let csv = format!(
            "{REDEMPTION_HEADER}\n\
             1,12/Apr/2019,P,acc,OC,1,100,1,1\n\
             2,2019-04-13,P,acc,OC,2,100,1,1\n"
        );
        match read_redemptions(csv.as_bytes()).unwrap_err() {
            Error::MalformedDate { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Date of Encashment");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_amount_aborts_batch() {
        let csv = format!("{REDEMPTION_HEADER}\n1,12/Apr/2019,P,acc,OC,1,ten,1,1\n");
        assert!(matches!(
            read_redemptions(csv.as_bytes()),
            Err(Error::MalformedAmount { row: 1, .. })
        ));
    }

    #[test]
    fn test_missing_column_is_input_error() {
        let csv = "Sr No.,Prefix,Bond Number\n1,OC,1\n";
        assert!(matches!(read_purchases(csv.as_bytes()), Err(Error::Input(_))));
    }

    #[test]
    fn test_invalid_serial_is_input_error() {
        let csv = format!("{REDEMPTION_HEADER}\nx,12/Apr/2019,P,acc,OC,1,100,1,1\n");
        assert!(matches!(read_redemptions(csv.as_bytes()), Err(Error::Input(_))));
    }

    #[test]
    fn test_serial_beyond_sqlite_integer_is_input_error() {
        let csv = format!("{REDEMPTION_HEADER}\n9223372036854775808,12/Apr/2019,P,acc,OC,1,100,1,1\n");
        assert!(matches!(read_redemptions(csv.as_bytes()), Err(Error::Input(_))));
        let csv = format!("{REDEMPTION_HEADER}\n9223372036854775807,12/Apr/2019,P,acc,OC,1,100,1,1\n");
        assert_eq!(read_redemptions(csv.as_bytes()).unwrap()[0].id, i64::MAX as u64);
    }

    #[test]
    fn test_two_digit_year_aborts_batch() {
        let csv = format!("{REDEMPTION_HEADER}\n1,12/Apr/19,P,acc,OC,1,100,1,1\n");
        assert!(matches!(
            read_redemptions(csv.as_bytes()),
            Err(Error::MalformedDate { row: 1, .. })
        ));
    }

    #[test]
    fn test_empty_source_reads_no_records() {
        let records = read_purchases(format!("{PURCHASE_HEADER}\n").as_bytes()).unwrap();
        assert!(records.is_empty());
    }
}
