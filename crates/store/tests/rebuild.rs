use bond_core::{Error, MatchOutcome, PurchaseRecord, ReconcileConfig, RedemptionRecord};
use bond_reconcile::build_ledger;
use bond_store::BondStore;
use chrono::NaiveDate;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 4, d).unwrap()
}

fn purchase(id: u64, bond_id: &str, status: &str) -> PurchaseRecord {
    PurchaseRecord {
        id,
        urn: format!("00001201904120000001{id:03}"),
        journal_date: date(12),
        purchase_date: date(12),
        expiry_date: date(26),
        purchaser_name: "A B C INDIA LIMITED".to_string(),
        bond_id: bond_id.to_string(),
        amount: 1_000_000,
        branch_code: "00001".to_string(),
        branch_teller: "1165".to_string(),
        status: status.to_string(),
    }
}

fn redemption(id: u64, bond_id: &str) -> RedemptionRecord {
    RedemptionRecord {
        id,
        encashment_date: date(20),
        party_name: "ALL INDIA TRINAMOOL CONGRESS".to_string(),
        party_account_no: "*******5199".to_string(),
        bond_id: bond_id.to_string(),
        amount: 1_000_000,
        branch_code: "00800".to_string(),
        branch_teller: "2770121".to_string(),
    }
}

#[test]
fn committed_ledger_is_visible_to_read_only_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("bonds.sqlite");

    let ledger = build_ledger(
        vec![purchase(1, "OC-775", "Paid"), purchase(2, "TL-11", "Expired")],
        vec![redemption(1, "OC-775")],
        &ReconcileConfig::default(),
    )
    .unwrap();
    let mut store = BondStore::open(&path).unwrap();
    store.replace_ledger(&ledger).unwrap();
    drop(store);

    let reader = BondStore::open_read_only(&path).unwrap();
    let tx = reader.transaction("OC-775").unwrap().unwrap();
    assert_eq!(tx.outcome, MatchOutcome::Matched);
    assert_eq!(tx.encashment_date, Some(date(20)));
    let tx = reader.transaction("TL-11").unwrap().unwrap();
    assert_eq!(tx.outcome, MatchOutcome::UnmatchedExpiredOrUnredeemed);
    assert_eq!(tx.party_name, None);
    assert_eq!(
        reader.party_names().unwrap(),
        ["ALL INDIA TRINAMOOL CONGRESS"]
    );
}

#[test]
fn failed_rebuild_leaves_file_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bonds.sqlite");

    let good = build_ledger(
        vec![purchase(1, "OC-775", "Paid")],
        vec![redemption(1, "OC-775")],
        &ReconcileConfig::default(),
    )
    .unwrap();
    let mut store = BondStore::open(&path).unwrap();
    store.replace_ledger(&good).unwrap();

    // Same serial on two redemptions breaks the write after the deletes ran.
    let bad = build_ledger(
        vec![],
        vec![redemption(5, "XX-1"), redemption(5, "XX-2")],
        &ReconcileConfig::default(),
    )
    .unwrap();
    assert!(matches!(store.replace_ledger(&bad), Err(Error::Database(_))));
    drop(store);

    let reader = BondStore::open_read_only(&path).unwrap();
    let txs = reader.transactions().unwrap();
    assert_eq!(txs, good.transactions);
    assert_eq!(reader.transaction("XX-1").unwrap(), None);
}

#[test]
fn read_only_open_rejects_uninitialized_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.sqlite");
    std::fs::write(&path, b"").unwrap();
    assert!(matches!(
        BondStore::open_read_only(&path),
        Err(Error::Database(_))
    ));
}

#[test]
fn read_only_open_of_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(BondStore::open_read_only(dir.path().join("missing.sqlite")).is_err());
}
