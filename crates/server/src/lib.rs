//! HTTP query API and ingestion entry point for reconciled electoral bond data.

pub mod api;
pub mod error;
pub mod ingest;

use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;

pub use error::ApiError;
pub use ingest::run_ingest;

/// Shared handler state. Each request opens its own read-only connection.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/parties/list", get(api::party_list))
        .route("/parties", get(api::parties))
        .route("/parties/transactions", get(api::parties_transactions))
        .route("/parties/:name", get(api::party))
        .route("/parties/:name/transactions", get(api::party_transactions))
        .route("/donors/list", get(api::donor_list))
        .route("/donors", get(api::donors))
        .route("/donors/transactions", get(api::donors_transactions))
        .route("/donors/:name", get(api::donor))
        .route("/donors/:name/transactions", get(api::donor_transactions))
        .route("/bond/:bond_id", get(api::bond))
        .with_state(state)
}
