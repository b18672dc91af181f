//! Error types for the bond reconciliation system.

use crate::types::Side;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the bond reconciliation system.
#[derive(Error, Debug)]
pub enum Error {
    /// A date cell did not match the `DD/Mon/YYYY` format.
    #[error("Malformed date in row {row}, column '{column}': '{value}'")]
    MalformedDate {
        row: usize,
        column: String,
        value: String,
    },

    /// An amount cell contained something other than grouped digits.
    #[error("Malformed amount in row {row}, column '{column}': '{value}'")]
    MalformedAmount {
        row: usize,
        column: String,
        value: String,
    },

    /// The same bond identifier appears more than once on one side.
    #[error("Duplicate bond id '{bond_id}' in {side} source (rows {first_row} and {second_row})")]
    DuplicateBondId {
        side: Side,
        bond_id: String,
        first_row: usize,
        second_row: usize,
    },

    /// A classification points at a record that does not exist.
    #[error("Dangling reference for bond '{bond_id}': {detail}")]
    DanglingReference { bond_id: String, detail: String },

    /// A purchase-only bond with a non-expired status under the reject policy.
    #[error("Unclassified bond '{bond_id}': purchase status '{status}' is not expired and no redemption exists")]
    UnclassifiedBond { bond_id: String, status: String },

    /// Purchase and redemption amounts disagree under strict reconciliation.
    #[error("Amount mismatch for bond '{bond_id}': purchase {purchase_amount}, redemption {redemption_amount}")]
    AmountMismatch {
        bond_id: String,
        purchase_amount: i64,
        redemption_amount: i64,
    },

    /// Structurally invalid input (bad CSV, missing column).
    #[error("Input error: {0}")]
    Input(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed date error.
    pub fn malformed_date(row: usize, column: impl Into<String>, value: impl Into<String>) -> Self {
        Error::MalformedDate {
            row,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a malformed amount error.
    pub fn malformed_amount(
        row: usize,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Error::MalformedAmount {
            row,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a dangling reference error.
    pub fn dangling(bond_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::DanglingReference {
            bond_id: bond_id.into(),
            detail: detail.into(),
        }
    }

    /// Create an input error.
    pub fn input(msg: impl Into<String>) -> Self {
        Error::Input(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Error::Database(msg.into())
    }

    /// Whether this error signals bad source data rather than a bug or an environment failure.
    pub fn is_data_quality(&self) -> bool {
        matches!(
            self,
            Error::MalformedDate { .. }
                | Error::MalformedAmount { .. }
                | Error::DuplicateBondId { .. }
                | Error::UnclassifiedBond { .. }
                | Error::AmountMismatch { .. }
                | Error::Input(_)
        )
    }
}
