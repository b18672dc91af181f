//! Record builders shared by unit tests.

use bond_core::{Amount, PurchaseRecord, RedemptionRecord};
use chrono::NaiveDate;

pub(crate) fn purchase(bond_id: &str, purchaser: &str, amount: Amount, status: &str) -> PurchaseRecord {
    let day = NaiveDate::from_ymd_opt(2019, 4, 12).unwrap();
    PurchaseRecord {
        id: 1,
        urn: format!("URN-{bond_id}"),
        journal_date: day,
        purchase_date: day,
        expiry_date: NaiveDate::from_ymd_opt(2019, 4, 26).unwrap(),
        purchaser_name: purchaser.to_string(),
        bond_id: bond_id.to_string(),
        amount,
        branch_code: "1".to_string(),
        branch_teller: "12".to_string(),
        status: status.to_string(),
    }
}

pub(crate) fn redemption(bond_id: &str, party: &str, amount: Amount) -> RedemptionRecord {
    RedemptionRecord {
        id: 1,
        encashment_date: NaiveDate::from_ymd_opt(2019, 4, 20).unwrap(),
        party_name: party.to_string(),
        party_account_no: "*******5199".to_string(),
        bond_id: bond_id.to_string(),
        amount,
        branch_code: "00800".to_string(),
        branch_teller: "2770121".to_string(),
    }
}
