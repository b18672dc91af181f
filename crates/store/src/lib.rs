//! SQLite persistence for the bond reconciliation system.
//!
//! Four tables mirror the pipeline stages: `purchase`, `redemption`,
//! `matching_status` and `bond_transaction`. Writes always replace the whole
//! ledger inside one transaction; readers open the file read-only.

pub mod schema;
pub mod store;

pub use schema::SCHEMA_VERSION;
pub use store::{BondStore, MatchingStatus, StoreStats};
