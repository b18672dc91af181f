//! Full rebuild of the reconciled ledger from one ingestion batch.

use crate::materializer::materialize;
use crate::reconciler::Reconciler;
use bond_core::{
    AmountMismatch, Classification, Error, MatchOutcome, PurchaseRecord, ReconcileConfig,
    RedemptionRecord, Result, Transaction,
};
use std::collections::HashSet;
use tracing::info;

/// Everything one pipeline run produces, ready to be persisted.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub purchases: Vec<PurchaseRecord>,
    pub redemptions: Vec<RedemptionRecord>,
    pub classifications: Vec<Classification>,
    pub transactions: Vec<Transaction>,
    pub amount_mismatches: Vec<AmountMismatch>,
}

impl Ledger {
    /// Number of transactions with the given outcome.
    pub fn count(&self, outcome: MatchOutcome) -> usize {
        self.transactions
            .iter()
            .filter(|tx| tx.outcome == outcome)
            .count()
    }
}

/// Reconcile and materialize a batch.
pub fn build_ledger(
    purchases: Vec<PurchaseRecord>,
    redemptions: Vec<RedemptionRecord>,
    config: &ReconcileConfig,
) -> Result<Ledger> {
    let reconciliation = Reconciler::new(config.clone()).reconcile(&purchases, &redemptions)?;
    let transactions = materialize(&reconciliation.classifications, &purchases, &redemptions)?;

    let mut seen = HashSet::with_capacity(transactions.len());
    if let Some(dup) = transactions.iter().find(|tx| !seen.insert(tx.bond_id.as_str())) {
        return Err(Error::dangling(&dup.bond_id, "bond materialized twice"));
    }

    let ledger = Ledger {
        purchases,
        redemptions,
        classifications: reconciliation.classifications,
        transactions,
        amount_mismatches: reconciliation.amount_mismatches,
    };
    info!(
        transactions = ledger.transactions.len(),
        matched = ledger.count(MatchOutcome::Matched),
        expired = ledger.count(MatchOutcome::UnmatchedExpiredOrUnredeemed),
        no_purchaser_data = ledger.count(MatchOutcome::UnmatchedNoPurchaserData),
        pending = ledger.count(MatchOutcome::UnmatchedPending),
        amount_mismatches = ledger.amount_mismatches.len(),
        "ledger built"
    );
    Ok(ledger)
}
