//! SQLite schema for the reconciled ledger.

use bond_core::{Error, Result};
use rusqlite::Connection;

/// Value stored in `PRAGMA user_version` once the schema exists.
pub const SCHEMA_VERSION: i64 = 1;

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS purchase (
      bond_id TEXT PRIMARY KEY,
      id INTEGER NOT NULL UNIQUE,
      urn TEXT NOT NULL,
      journal_date TEXT NOT NULL,
      purchase_date TEXT NOT NULL,
      expiry_date TEXT NOT NULL,
      purchaser_name TEXT NOT NULL,
      amount INTEGER NOT NULL,
      branch_code TEXT NOT NULL,
      branch_teller TEXT NOT NULL,
      status TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS redemption (
      bond_id TEXT PRIMARY KEY,
      id INTEGER NOT NULL UNIQUE,
      encashment_date TEXT NOT NULL,
      party_name TEXT NOT NULL,
      party_account_no TEXT NOT NULL,
      amount INTEGER NOT NULL,
      branch_code TEXT NOT NULL,
      branch_teller TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS matching_status (
      bond_id TEXT PRIMARY KEY,
      status TEXT NOT NULL,
      purchaser_id INTEGER REFERENCES purchase(id),
      redeemer_id INTEGER REFERENCES redemption(id)
    );
    CREATE TABLE IF NOT EXISTS bond_transaction (
      bond_id TEXT PRIMARY KEY,
      purchaser_name TEXT,
      party_name TEXT,
      amount INTEGER NOT NULL,
      encashment_date TEXT,
      purchase_date TEXT,
      expiry_date TEXT,
      status TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_purchase_purchaser_name ON purchase(purchaser_name);
    CREATE INDEX IF NOT EXISTS idx_redemption_party_name ON redemption(party_name);
    CREATE INDEX IF NOT EXISTS idx_bond_transaction_party_name ON bond_transaction(party_name);
    CREATE INDEX IF NOT EXISTS idx_bond_transaction_purchaser_name ON bond_transaction(purchaser_name);
";

pub(crate) fn user_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}

/// Create the tables on a fresh database, or check the version of an existing one.
pub(crate) fn ensure_schema(conn: &Connection) -> Result<()> {
    match user_version(conn)? {
        0 => {
            conn.execute_batch(CREATE_TABLES)
                .map_err(|e| Error::database(e.to_string()))?;
            conn.execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION};"))
                .map_err(|e| Error::database(e.to_string()))
        }
        SCHEMA_VERSION => Ok(()),
        other => Err(Error::database(format!(
            "unsupported schema version {other} (expected {SCHEMA_VERSION})"
        ))),
    }
}

/// Check that a database opened read-only has been initialized.
pub(crate) fn check_schema(conn: &Connection) -> Result<()> {
    match user_version(conn)? {
        SCHEMA_VERSION => Ok(()),
        0 => Err(Error::database("database is not initialized; run ingest first")),
        other => Err(Error::database(format!(
            "unsupported schema version {other} (expected {SCHEMA_VERSION})"
        ))),
    }
}
