//! Core data types for the bond reconciliation system.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Amount in the smallest currency unit.
pub type Amount = i64;

/// Which source a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bond purchase (donor) records.
    Purchase,
    /// Bond redemption (party) records.
    Redemption,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Purchase => f.write_str("purchase"),
            Side::Redemption => f.write_str("redemption"),
        }
    }
}

/// A single bond purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Serial number from the published report.
    pub id: u64,
    /// Reference number (URN).
    pub urn: String,
    pub journal_date: NaiveDate,
    pub purchase_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub purchaser_name: String,
    /// `{prefix}-{bond_number}`.
    pub bond_id: String,
    pub amount: Amount,
    /// Issuing branch code.
    pub branch_code: String,
    /// Issuing teller.
    pub branch_teller: String,
    /// Free-text status, e.g. "Expired" or blank.
    pub status: String,
}

/// A single bond redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    /// Serial number from the published report.
    pub id: u64,
    pub encashment_date: NaiveDate,
    pub party_name: String,
    pub party_account_no: String,
    /// `{prefix}-{bond_number}`.
    pub bond_id: String,
    pub amount: Amount,
    /// Paying branch code.
    pub branch_code: String,
    /// Paying teller.
    pub branch_teller: String,
}

/// Outcome of reconciling one bond identifier.
///
/// The serialized form is the status string stored in the transaction table
/// and returned by the query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// Present in both sources.
    #[serde(rename = "Matched")]
    Matched,
    /// Purchase only, and the purchase status says the bond expired.
    #[serde(rename = "Not Matched - No Redeemer Data - Bond Expired/Not Redeemed")]
    UnmatchedExpiredOrUnredeemed,
    /// Redemption only; the purchase report has no record for it.
    #[serde(rename = "Not Matched - No Purchaser Data - Data Unavailable")]
    UnmatchedNoPurchaserData,
    /// Purchase only, with a status that does not say expired.
    #[serde(rename = "Not Matched - No Redeemer Data - Status Pending")]
    UnmatchedPending,
}

impl MatchOutcome {
    /// All outcomes, in reporting order.
    pub const ALL: [MatchOutcome; 4] = [
        MatchOutcome::Matched,
        MatchOutcome::UnmatchedExpiredOrUnredeemed,
        MatchOutcome::UnmatchedNoPurchaserData,
        MatchOutcome::UnmatchedPending,
    ];

    /// Wire/status string.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchOutcome::Matched => "Matched",
            MatchOutcome::UnmatchedExpiredOrUnredeemed => {
                "Not Matched - No Redeemer Data - Bond Expired/Not Redeemed"
            }
            MatchOutcome::UnmatchedNoPurchaserData => {
                "Not Matched - No Purchaser Data - Data Unavailable"
            }
            MatchOutcome::UnmatchedPending => "Not Matched - No Redeemer Data - Status Pending",
        }
    }

    /// Is this bond present on both sides?
    #[inline]
    pub fn is_matched(self) -> bool {
        self == MatchOutcome::Matched
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchOutcome {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchOutcome::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| crate::Error::database(format!("unknown match status '{s}'")))
    }
}

/// Classification of one bond identifier, with indices into the ingested sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub bond_id: String,
    pub outcome: MatchOutcome,
    /// Position in the purchase sequence, if a purchase exists.
    pub purchase_index: Option<usize>,
    /// Position in the redemption sequence, if a redemption exists.
    pub redemption_index: Option<usize>,
}

/// Denormalized view of one bond, consumed by all queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub bond_id: String,
    pub purchaser_name: Option<String>,
    pub party_name: Option<String>,
    /// Purchase amount when a purchase exists, otherwise the redemption amount.
    pub amount: Amount,
    pub encashment_date: Option<NaiveDate>,
    pub purchase_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    #[serde(rename = "status")]
    pub outcome: MatchOutcome,
}

/// Purchase and redemption amounts that disagree for a matched bond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountMismatch {
    pub bond_id: String,
    pub purchase_amount: Amount,
    pub redemption_amount: Amount,
}
