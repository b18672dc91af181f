//! Reconciliation of bond purchases against redemptions.
//!
//! This crate handles:
//! - Classifying every bond id seen in either source (hash join)
//! - Materializing one transaction per bond
//! - Per-party and per-donor summaries over transactions

pub mod materializer;
pub mod pipeline;
pub mod reconciler;
pub mod summary;

#[cfg(test)]
mod testing;

pub use materializer::materialize;
pub use pipeline::{build_ledger, Ledger};
pub use reconciler::{Reconciler, Reconciliation};
pub use summary::{
    donor_summaries, donor_summary, party_summaries, party_summary, transactions_by_donor,
    transactions_by_party, DonorSummary, PartySummary,
};
