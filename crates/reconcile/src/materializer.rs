//! Transaction materialization.
//!
//! Joins each classification back to its source records and produces one
//! denormalized [`Transaction`] per bond id, with `None` for the missing side.

use bond_core::{Classification, Error, PurchaseRecord, RedemptionRecord, Result, Transaction};

/// Resolve an optional index into a record sequence, checking that the record
/// carries the classified bond id.
fn resolve<'a, T>(
    records: &'a [T],
    index: Option<usize>,
    bond_id: &str,
    side: &str,
    record_bond_id: impl Fn(&T) -> &str,
) -> Result<Option<&'a T>> {
    let Some(i) = index else {
        return Ok(None);
    };
    let record = records.get(i).ok_or_else(|| {
        Error::dangling(
            bond_id,
            format!("{side} index {i} out of range (len {})", records.len()),
        )
    })?;
    if record_bond_id(record) != bond_id {
        return Err(Error::dangling(
            bond_id,
            format!(
                "{side} index {i} points at bond '{}'",
                record_bond_id(record)
            ),
        ));
    }
    Ok(Some(record))
}

/// Build one transaction per classification.
///
/// Output order follows the classification order.
pub fn materialize(
    classifications: &[Classification],
    purchases: &[PurchaseRecord],
    redemptions: &[RedemptionRecord],
) -> Result<Vec<Transaction>> {
    classifications
        .iter()
        .map(|c| {
            let purchase = resolve(purchases, c.purchase_index, &c.bond_id, "purchase", |p| {
                p.bond_id.as_str()
            })?;
            let redemption = resolve(
                redemptions,
                c.redemption_index,
                &c.bond_id,
                "redemption",
                |r| r.bond_id.as_str(),
            )?;

            let amount = match (purchase, redemption) {
                (Some(p), _) => p.amount,
                (None, Some(r)) => r.amount,
                (None, None) => {
                    return Err(Error::dangling(
                        &c.bond_id,
                        "classification references no record",
                    ))
                }
            };

            Ok(Transaction {
                bond_id: c.bond_id.clone(),
                purchaser_name: purchase.map(|p| p.purchaser_name.clone()),
                party_name: redemption.map(|r| r.party_name.clone()),
                amount,
                encashment_date: redemption.map(|r| r.encashment_date),
                purchase_date: purchase.map(|p| p.purchase_date),
                expiry_date: purchase.map(|p| p.expiry_date),
                outcome: c.outcome,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{purchase, redemption};
    use bond_core::MatchOutcome;

    fn classification(
        bond_id: &str,
        outcome: MatchOutcome,
        purchase_index: Option<usize>,
        redemption_index: Option<usize>,
    ) -> Classification {
        Classification {
            bond_id: bond_id.to_string(),
            outcome,
            purchase_index,
            redemption_index,
        }
    }

    #[test]
    fn test_matched_copies_both_sides() {
        let purchases = vec![purchase("A-1", "X", 100_000, "Active")];
        let redemptions = vec![redemption("A-1", "Y", 100_000)];
        let cs = vec![classification("A-1", MatchOutcome::Matched, Some(0), Some(0))];

        let txs = materialize(&cs, &purchases, &redemptions).unwrap();

        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.purchaser_name.as_deref(), Some("X"));
        assert_eq!(tx.party_name.as_deref(), Some("Y"));
        assert_eq!(tx.amount, 100_000);
        assert_eq!(tx.purchase_date, Some(purchases[0].purchase_date));
        assert_eq!(tx.expiry_date, Some(purchases[0].expiry_date));
        assert_eq!(tx.encashment_date, Some(redemptions[0].encashment_date));
        assert_eq!(tx.outcome, MatchOutcome::Matched);
    }

    #[test]
    fn test_purchase_amount_is_authoritative() {
        let purchases = vec![purchase("A-1", "X", 100_000, "")];
        let redemptions = vec![redemption("A-1", "Y", 1)];
        let cs = vec![classification("A-1", MatchOutcome::Matched, Some(0), Some(0))];
        let txs = materialize(&cs, &purchases, &redemptions).unwrap();
        assert_eq!(txs[0].amount, 100_000);
    }

    #[test]
    fn test_missing_sides_are_none() {
        let purchases = vec![purchase("B-2", "X", 50_000, "Expired")];
        let redemptions = vec![redemption("C-3", "Y", 75_000)];
        let cs = vec![
            classification("B-2", MatchOutcome::UnmatchedExpiredOrUnredeemed, Some(0), None),
            classification("C-3", MatchOutcome::UnmatchedNoPurchaserData, None, Some(0)),
        ];

        let txs = materialize(&cs, &purchases, &redemptions).unwrap();

        assert_eq!(txs[0].party_name, None);
        assert_eq!(txs[0].encashment_date, None);
        assert_eq!(txs[0].amount, 50_000);
        assert_eq!(txs[1].purchaser_name, None);
        assert_eq!(txs[1].purchase_date, None);
        assert_eq!(txs[1].expiry_date, None);
        assert_eq!(txs[1].amount, 75_000);
    }

    #[test]
    fn test_out_of_range_index_is_dangling() {
        let purchases = vec![purchase("A-1", "X", 1, "")];
        let cs = vec![classification("A-1", MatchOutcome::Matched, Some(0), Some(3))];
        let err = materialize(&cs, &purchases, &[]).unwrap_err();
        assert!(matches!(err, Error::DanglingReference { .. }));
    }

    #[test]
    fn test_wrong_record_is_dangling() {
        let purchases = vec![purchase("A-1", "X", 1, ""), purchase("B-2", "X", 1, "")];
        let cs = vec![classification("A-1", MatchOutcome::UnmatchedPending, Some(1), None)];
        let err = materialize(&cs, &purchases, &[]).unwrap_err();
        assert!(err.to_string().contains("points at bond 'B-2'"));
    }

    #[test]
    fn test_no_reference_is_dangling() {
        let cs = vec![classification("A-1", MatchOutcome::Matched, None, None)];
        assert!(matches!(
            materialize(&cs, &[], &[]),
            Err(Error::DanglingReference { .. })
        ));
    }
}
