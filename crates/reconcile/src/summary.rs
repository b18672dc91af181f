//! Per-party and per-donor summaries over materialized transactions.
//!
//! Every function is a fold over an immutable slice and returns a fresh
//! result. Matched transactions feed the totals and the counterparty
//! breakdown; everything else is counted as unmatched.

use bond_core::{Amount, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Donations received by one political party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySummary {
    /// Sum of matched amounts.
    pub total_amount: Amount,
    /// Number of matched bonds.
    pub total_transactions: u64,
    /// Matched amount per donor.
    pub donor_donations: BTreeMap<String, Amount>,
    /// Redeemed bonds with no purchaser data.
    pub predata_bonds: u64,
    pub predata_amount: Amount,
}

impl PartySummary {
    fn record(&mut self, tx: &Transaction) {
        if tx.outcome.is_matched() {
            self.total_amount = self.total_amount.saturating_add(tx.amount);
            self.total_transactions += 1;
            if let Some(donor) = &tx.purchaser_name {
                let total = self.donor_donations.entry(donor.clone()).or_default();
                *total = total.saturating_add(tx.amount);
            }
        } else {
            self.predata_bonds += 1;
            self.predata_amount = self.predata_amount.saturating_add(tx.amount);
        }
    }
}

/// Donations made by one purchaser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorSummary {
    /// Sum of matched amounts.
    pub total_amount: Amount,
    /// Number of matched bonds.
    pub total_transactions: u64,
    /// Matched amount per party.
    pub party_donations: BTreeMap<String, Amount>,
    /// Purchased bonds with no redemption (expired or pending).
    pub expired_bonds: u64,
    pub expired_amount: Amount,
}

impl DonorSummary {
    fn record(&mut self, tx: &Transaction) {
        if tx.outcome.is_matched() {
            self.total_amount = self.total_amount.saturating_add(tx.amount);
            self.total_transactions += 1;
            if let Some(party) = &tx.party_name {
                let total = self.party_donations.entry(party.clone()).or_default();
                *total = total.saturating_add(tx.amount);
            }
        } else {
            self.expired_bonds += 1;
            self.expired_amount = self.expired_amount.saturating_add(tx.amount);
        }
    }
}

/// Summary for one party. Unknown names yield a zeroed summary.
pub fn party_summary(party: &str, transactions: &[Transaction]) -> PartySummary {
    transactions
        .iter()
        .filter(|tx| tx.party_name.as_deref() == Some(party))
        .fold(PartySummary::default(), |mut summary, tx| {
            summary.record(tx);
            summary
        })
}

/// Summary for one donor. Unknown names yield a zeroed summary.
pub fn donor_summary(donor: &str, transactions: &[Transaction]) -> DonorSummary {
    transactions
        .iter()
        .filter(|tx| tx.purchaser_name.as_deref() == Some(donor))
        .fold(DonorSummary::default(), |mut summary, tx| {
            summary.record(tx);
            summary
        })
}

/// Summaries for every party appearing in `transactions`, in one pass.
pub fn party_summaries(transactions: &[Transaction]) -> BTreeMap<String, PartySummary> {
    transactions
        .iter()
        .fold(BTreeMap::new(), |mut acc: BTreeMap<String, PartySummary>, tx| {
            if let Some(party) = &tx.party_name {
                acc.entry(party.clone()).or_default().record(tx);
            }
            acc
        })
}

/// Summaries for every donor appearing in `transactions`, in one pass.
pub fn donor_summaries(transactions: &[Transaction]) -> BTreeMap<String, DonorSummary> {
    transactions
        .iter()
        .fold(BTreeMap::new(), |mut acc: BTreeMap<String, DonorSummary>, tx| {
            if let Some(donor) = &tx.purchaser_name {
                acc.entry(donor.clone()).or_default().record(tx);
            }
            acc
        })
}

/// Transactions grouped by party name.
pub fn transactions_by_party(transactions: &[Transaction]) -> BTreeMap<String, Vec<Transaction>> {
    group_by(transactions, |tx| tx.party_name.as_deref())
}

/// Transactions grouped by purchaser name.
pub fn transactions_by_donor(transactions: &[Transaction]) -> BTreeMap<String, Vec<Transaction>> {
    group_by(transactions, |tx| tx.purchaser_name.as_deref())
}

fn group_by<F>(transactions: &[Transaction], key: F) -> BTreeMap<String, Vec<Transaction>>
where
    F: Fn(&Transaction) -> Option<&str>,
{
    let mut groups: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
    for tx in transactions {
        if let Some(name) = key(tx) {
            groups.entry(name.to_string()).or_default().push(tx.clone());
        }
    }
    groups
}
