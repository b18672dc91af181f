//! Data ingestion and normalization for the bond reconciliation system.
//!
//! This crate handles:
//! - Reading the purchase and redemption CSV reports
//! - Bond identifier derivation (`{prefix}-{bond_number}`)
//! - Report date and amount parsing

pub mod parse;
pub mod reader;

pub use parse::{bond_id, parse_amount, parse_date, MAX_AMOUNT, REPORT_DATE_FORMAT};
pub use reader::{
    read_purchases, read_purchases_path, read_redemptions, read_redemptions_path, IngestBatch,
    IngestReport,
};
