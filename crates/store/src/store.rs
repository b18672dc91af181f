//! Bond store: atomic full rebuild and read-only queries.

use crate::schema::{check_schema, ensure_schema};
use bond_core::{
    Error, MatchOutcome, PurchaseRecord, RedemptionRecord, Result, Side, Transaction,
};
use bond_reconcile::Ledger;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

fn db(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// Persisted classification row, with serial ids instead of sequence indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingStatus {
    pub bond_id: String,
    pub outcome: MatchOutcome,
    pub purchaser_id: Option<u64>,
    pub redeemer_id: Option<u64>,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub purchases: usize,
    pub redemptions: usize,
    pub classifications: usize,
    pub transactions: usize,
}

const TRANSACTION_COLUMNS: &str = "bond_id, purchaser_name, party_name, amount, encashment_date, purchase_date, expiry_date, status";

fn parse_outcome(row: &Row<'_>, idx: usize) -> rusqlite::Result<MatchOutcome> {
    let raw: String = row.get(idx)?;
    raw.parse::<MatchOutcome>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        bond_id: row.get(0)?,
        purchaser_name: row.get(1)?,
        party_name: row.get(2)?,
        amount: row.get(3)?,
        encashment_date: row.get(4)?,
        purchase_date: row.get(5)?,
        expiry_date: row.get(6)?,
        outcome: parse_outcome(row, 7)?,
    })
}

fn purchase_from_row(row: &Row<'_>) -> rusqlite::Result<PurchaseRecord> {
    Ok(PurchaseRecord {
        id: row.get::<_, i64>(0)? as u64,
        urn: row.get(1)?,
        journal_date: row.get(2)?,
        purchase_date: row.get(3)?,
        expiry_date: row.get(4)?,
        purchaser_name: row.get(5)?,
        bond_id: row.get(6)?,
        amount: row.get(7)?,
        branch_code: row.get(8)?,
        branch_teller: row.get(9)?,
        status: row.get(10)?,
    })
}

fn redemption_from_row(row: &Row<'_>) -> rusqlite::Result<RedemptionRecord> {
    Ok(RedemptionRecord {
        id: row.get::<_, i64>(0)? as u64,
        encashment_date: row.get(1)?,
        party_name: row.get(2)?,
        party_account_no: row.get(3)?,
        bond_id: row.get(4)?,
        amount: row.get(5)?,
        branch_code: row.get(6)?,
        branch_teller: row.get(7)?,
    })
}

/// SQLite-backed store of the reconciled ledger.
pub struct BondStore {
    conn: Connection,
}

impl BondStore {
    /// Open (or create) a database for writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(db)?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().map_err(db)?)
    }

    /// Open an existing, initialized database for reading only.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(db)?;
        check_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;").map_err(db)?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Replace the whole ledger in one transaction.
    ///
    /// On any error the transaction is dropped uncommitted and the previous
    /// contents stay visible.
    pub fn replace_ledger(&mut self, ledger: &Ledger) -> Result<StoreStats> {
        let tx = self.conn.transaction().map_err(db)?;
        tx.execute_batch(
            "
            DELETE FROM bond_transaction;
            DELETE FROM matching_status;
            DELETE FROM purchase;
            DELETE FROM redemption;
            ",
        )
        .map_err(db)?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO purchase (
                      id, urn, journal_date, purchase_date, expiry_date, purchaser_name,
                      bond_id, amount, branch_code, branch_teller, status
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                )
                .map_err(db)?;
            for p in &ledger.purchases {
                stmt.execute(params![
                    p.id as i64,
                    p.urn,
                    p.journal_date,
                    p.purchase_date,
                    p.expiry_date,
                    p.purchaser_name,
                    p.bond_id,
                    p.amount,
                    p.branch_code,
                    p.branch_teller,
                    p.status
                ])
                .map_err(db)?;
            }

            let mut stmt = tx
                .prepare(
                    "INSERT INTO redemption (
                      id, encashment_date, party_name, party_account_no, bond_id,
                      amount, branch_code, branch_teller
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(db)?;
            for r in &ledger.redemptions {
                stmt.execute(params![
                    r.id as i64,
                    r.encashment_date,
                    r.party_name,
                    r.party_account_no,
                    r.bond_id,
                    r.amount,
                    r.branch_code,
                    r.branch_teller
                ])
                .map_err(db)?;
            }

            let mut stmt = tx
                .prepare(
                    "INSERT INTO matching_status (bond_id, status, purchaser_id, redeemer_id)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(db)?;
            for c in &ledger.classifications {
                let purchaser_id = serial_for(&ledger.purchases, c.purchase_index, &c.bond_id, Side::Purchase, |p| p.id)?;
                let redeemer_id = serial_for(&ledger.redemptions, c.redemption_index, &c.bond_id, Side::Redemption, |r| r.id)?;
                stmt.execute(params![
                    c.bond_id,
                    c.outcome.as_str(),
                    purchaser_id.map(|id| id as i64),
                    redeemer_id.map(|id| id as i64)
                ])
                .map_err(db)?;
            }

            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO bond_transaction ({TRANSACTION_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ))
                .map_err(db)?;
            for t in &ledger.transactions {
                stmt.execute(params![
                    t.bond_id,
                    t.purchaser_name,
                    t.party_name,
                    t.amount,
                    t.encashment_date,
                    t.purchase_date,
                    t.expiry_date,
                    t.outcome.as_str()
                ])
                .map_err(db)?;
            }
        }

        tx.commit().map_err(db)?;
        let stats = self.stats()?;
        info!(
            purchases = stats.purchases,
            redemptions = stats.redemptions,
            transactions = stats.transactions,
            "ledger committed"
        );
        Ok(stats)
    }

    /// Row counts per table.
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<usize> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get::<_, i64>(0)
                })
                .map(|n| n as usize)
                .map_err(db)
        };
        Ok(StoreStats {
            purchases: count("purchase")?,
            redemptions: count("redemption")?,
            classifications: count("matching_status")?,
            transactions: count("bond_transaction")?,
        })
    }

    /// Distinct party names, sorted.
    pub fn party_names(&self) -> Result<Vec<String>> {
        self.names("SELECT DISTINCT party_name FROM redemption ORDER BY party_name")
    }

    /// Distinct purchaser names, sorted.
    pub fn donor_names(&self) -> Result<Vec<String>> {
        self.names("SELECT DISTINCT purchaser_name FROM purchase ORDER BY purchaser_name")
    }

    fn names(&self, sql: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(sql).map_err(db)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(db)?;
        rows.collect::<rusqlite::Result<Vec<String>>>().map_err(db)
    }

    /// All transactions, in materialization order.
    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        self.query_transactions(
            &format!("SELECT {TRANSACTION_COLUMNS} FROM bond_transaction ORDER BY rowid"),
            None,
        )
    }

    /// Transactions redeemed by `party`.
    pub fn transactions_for_party(&self, party: &str) -> Result<Vec<Transaction>> {
        self.query_transactions(
            &format!(
                "SELECT {TRANSACTION_COLUMNS} FROM bond_transaction WHERE party_name = ?1 ORDER BY rowid"
            ),
            Some(party),
        )
    }

    /// Transactions purchased by `donor`.
    pub fn transactions_for_donor(&self, donor: &str) -> Result<Vec<Transaction>> {
        self.query_transactions(
            &format!(
                "SELECT {TRANSACTION_COLUMNS} FROM bond_transaction WHERE purchaser_name = ?1 ORDER BY rowid"
            ),
            Some(donor),
        )
    }

    fn query_transactions(&self, sql: &str, name: Option<&str>) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(sql).map_err(db)?;
        let rows = match name {
            Some(name) => stmt.query_map(params![name], transaction_from_row),
            None => stmt.query_map([], transaction_from_row),
        }
        .map_err(db)?;
        let txs = rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db)?;
        debug!(rows = txs.len(), "transactions loaded");
        Ok(txs)
    }

    /// Transaction for one bond.
    pub fn transaction(&self, bond_id: &str) -> Result<Option<Transaction>> {
        self.conn
            .query_row(
                &format!("SELECT {TRANSACTION_COLUMNS} FROM bond_transaction WHERE bond_id = ?1"),
                params![bond_id],
                transaction_from_row,
            )
            .optional()
            .map_err(db)
    }

    /// Purchase record for one bond.
    pub fn purchase(&self, bond_id: &str) -> Result<Option<PurchaseRecord>> {
        self.conn
            .query_row(
                "SELECT id, urn, journal_date, purchase_date, expiry_date, purchaser_name,
                        bond_id, amount, branch_code, branch_teller, status
                 FROM purchase WHERE bond_id = ?1",
                params![bond_id],
                purchase_from_row,
            )
            .optional()
            .map_err(db)
    }

    /// Redemption record for one bond.
    pub fn redemption(&self, bond_id: &str) -> Result<Option<RedemptionRecord>> {
        self.conn
            .query_row(
                "SELECT id, encashment_date, party_name, party_account_no, bond_id,
                        amount, branch_code, branch_teller
                 FROM redemption WHERE bond_id = ?1",
                params![bond_id],
                redemption_from_row,
            )
            .optional()
            .map_err(db)
    }

    /// Persisted classification for one bond.
    pub fn classification(&self, bond_id: &str) -> Result<Option<MatchingStatus>> {
        self.conn
            .query_row(
                "SELECT bond_id, status, purchaser_id, redeemer_id
                 FROM matching_status WHERE bond_id = ?1",
                params![bond_id],
                |row| {
                    Ok(MatchingStatus {
                        bond_id: row.get(0)?,
                        outcome: parse_outcome(row, 1)?,
                        purchaser_id: row.get::<_, Option<i64>>(2)?.map(|id| id as u64),
                        redeemer_id: row.get::<_, Option<i64>>(3)?.map(|id| id as u64),
                    })
                },
            )
            .optional()
            .map_err(db)
    }
}

/// Serial id of the record a classification points at.
fn serial_for<T>(
    records: &[T],
    index: Option<usize>,
    bond_id: &str,
    side: Side,
    id: impl Fn(&T) -> u64,
) -> Result<Option<u64>> {
    index
        .map(|i| {
            records.get(i).map(&id).ok_or_else(|| {
                Error::dangling(bond_id, format!("{side} index {i} out of range"))
            })
        })
        .transpose()
}
