//! Bond reconciliation by identifier.
//!
//! Pairs purchase and redemption records with a two-pass hash join: one index
//! per side, then a single walk over the union of keys. Every distinct bond
//! identifier gets exactly one classification.

use bond_core::{
    AmountMismatch, Classification, Error, MatchOutcome, PurchaseRecord, ReconcileConfig,
    RedemptionRecord, Result, Side, UnredeemedPolicy,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Output of a reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// One entry per distinct bond id, purchases first, then redemption-only bonds.
    pub classifications: Vec<Classification>,
    /// Matched bonds whose two sides disagree on the amount.
    pub amount_mismatches: Vec<AmountMismatch>,
}

impl Reconciliation {
    /// Number of classifications with the given outcome.
    pub fn count(&self, outcome: MatchOutcome) -> usize {
        self.classifications
            .iter()
            .filter(|c| c.outcome == outcome)
            .count()
    }
}

/// Index records by bond id, rejecting duplicates.
///
/// Row numbers in the error are 1-based positions in the source sequence.
fn build_index<'a, T>(
    records: &'a [T],
    side: Side,
    key: impl Fn(&'a T) -> &'a str,
) -> Result<HashMap<&'a str, usize>> {
    let mut index = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let bond_id = key(record);
        if let Some(&first) = index.get(bond_id) {
            return Err(Error::DuplicateBondId {
                side,
                bond_id: bond_id.to_string(),
                first_row: first + 1,
                second_row: i + 1,
            });
        }
        index.insert(bond_id, i);
    }
    Ok(index)
}

/// Classifies bonds across the purchase and redemption sources.
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Classify every bond id present in either source.
    pub fn reconcile(
        &self,
        purchases: &[PurchaseRecord],
        redemptions: &[RedemptionRecord],
    ) -> Result<Reconciliation> {
        let purchase_index = build_index(purchases, Side::Purchase, |p| p.bond_id.as_str())?;
        let redemption_index =
            build_index(redemptions, Side::Redemption, |r| r.bond_id.as_str())?;
        debug!(
            purchases = purchase_index.len(),
            redemptions = redemption_index.len(),
            "indices built"
        );

        let mut result = Reconciliation {
            classifications: Vec::with_capacity(purchases.len() + redemptions.len()),
            amount_mismatches: Vec::new(),
        };

        for (pi, purchase) in purchases.iter().enumerate() {
            let ri = redemption_index.get(purchase.bond_id.as_str()).copied();
            let outcome = match ri {
                Some(ri) => {
                    self.check_amounts(purchase, &redemptions[ri], &mut result)?;
                    MatchOutcome::Matched
                }
                None => self.classify_unredeemed(purchase)?,
            };
            result.classifications.push(Classification {
                bond_id: purchase.bond_id.clone(),
                outcome,
                purchase_index: Some(pi),
                redemption_index: ri,
            });
        }

        for (ri, redemption) in redemptions.iter().enumerate() {
            if purchase_index.contains_key(redemption.bond_id.as_str()) {
                continue;
            }
            result.classifications.push(Classification {
                bond_id: redemption.bond_id.clone(),
                outcome: MatchOutcome::UnmatchedNoPurchaserData,
                purchase_index: None,
                redemption_index: Some(ri),
            });
        }

        Ok(result)
    }

    /// Outcome for a purchase with no redemption.
    fn classify_unredeemed(&self, purchase: &PurchaseRecord) -> Result<MatchOutcome> {
        if self.config.is_expired(&purchase.status) {
            return Ok(MatchOutcome::UnmatchedExpiredOrUnredeemed);
        }
        match self.config.unredeemed_policy {
            UnredeemedPolicy::Pending => Ok(MatchOutcome::UnmatchedPending),
            UnredeemedPolicy::Reject => Err(Error::UnclassifiedBond {
                bond_id: purchase.bond_id.clone(),
                status: purchase.status.clone(),
            }),
        }
    }

    /// Cross-check amounts of a matched pair. The purchase amount stays authoritative.
    fn check_amounts(
        &self,
        purchase: &PurchaseRecord,
        redemption: &RedemptionRecord,
        result: &mut Reconciliation,
    ) -> Result<()> {
        if purchase.amount == redemption.amount {
            return Ok(());
        }
        if self.config.reject_amount_mismatch {
            return Err(Error::AmountMismatch {
                bond_id: purchase.bond_id.clone(),
                purchase_amount: purchase.amount,
                redemption_amount: redemption.amount,
            });
        }
        warn!(
            bond_id = %purchase.bond_id,
            purchase_amount = purchase.amount,
            redemption_amount = redemption.amount,
            "matched bond amounts differ"
        );
        result.amount_mismatches.push(AmountMismatch {
            bond_id: purchase.bond_id.clone(),
            purchase_amount: purchase.amount,
            redemption_amount: redemption.amount,
        });
        Ok(())
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}
