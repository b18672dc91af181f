use bond_core::{Config, Result};
use bond_ingestion::IngestBatch;
use bond_reconcile::build_ledger;
use bond_store::{BondStore, StoreStats};
use std::path::Path;
use tracing::info;

/// Read both reports, reconcile them and rebuild the store.
///
/// The store is only opened once the whole pipeline succeeded, so a data
/// quality failure never touches the database.
pub fn run_ingest(
    purchases: impl AsRef<Path>,
    redemptions: impl AsRef<Path>,
    config: &Config,
) -> Result<StoreStats> {
    let batch = IngestBatch::from_paths(purchases, redemptions)?;
    let ledger = build_ledger(batch.purchases, batch.redemptions, &config.reconcile)?;

    let mut store = BondStore::open(&config.store.path)?;
    let stats = store.replace_ledger(&ledger)?;
    info!(
        db = %config.store.path.display(),
        transactions = stats.transactions,
        mismatches = ledger.amount_mismatches.len(),
        "ingest complete"
    );
    Ok(stats)
}
