//! Read-only query endpoints.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use bond_core::{MatchOutcome, PurchaseRecord, RedemptionRecord, Transaction};
use bond_reconcile::{
    donor_summaries, donor_summary, party_summaries, party_summary, transactions_by_donor,
    transactions_by_party, DonorSummary, PartySummary,
};
use bond_store::BondStore;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Run a query against a fresh read-only connection on the blocking pool.
async fn with_store<T, F>(state: &AppState, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&BondStore) -> bond_core::Result<T> + Send + 'static,
{
    let path = state.db_path.clone();
    let out = tokio::task::spawn_blocking(move || {
        let store = BondStore::open_read_only(path.as_path())?;
        query(&store)
    })
    .await??;
    Ok(out)
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Electoral Bond API" }))
}

pub async fn party_list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(Json(with_store(&state, |s| s.party_names()).await?))
}

pub async fn parties(State(state): State<AppState>) -> ApiResult<BTreeMap<String, PartySummary>> {
    let txs = with_store(&state, |s| s.transactions()).await?;
    Ok(Json(party_summaries(&txs)))
}

pub async fn parties_transactions(
    State(state): State<AppState>,
) -> ApiResult<BTreeMap<String, Vec<Transaction>>> {
    let txs = with_store(&state, |s| s.transactions()).await?;
    Ok(Json(transactions_by_party(&txs)))
}

pub async fn party(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<PartySummary> {
    debug!(party = %name, "party summary");
    let txs = {
        let name = name.clone();
        with_store(&state, move |s| s.transactions_for_party(&name)).await?
    };
    Ok(Json(party_summary(&name, &txs)))
}

pub async fn party_transactions(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<Transaction>> {
    Ok(Json(
        with_store(&state, move |s| s.transactions_for_party(&name)).await?,
    ))
}

pub async fn donor_list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(Json(with_store(&state, |s| s.donor_names()).await?))
}

pub async fn donors(State(state): State<AppState>) -> ApiResult<BTreeMap<String, DonorSummary>> {
    let txs = with_store(&state, |s| s.transactions()).await?;
    Ok(Json(donor_summaries(&txs)))
}

pub async fn donors_transactions(
    State(state): State<AppState>,
) -> ApiResult<BTreeMap<String, Vec<Transaction>>> {
    let txs = with_store(&state, |s| s.transactions()).await?;
    Ok(Json(transactions_by_donor(&txs)))
}

pub async fn donor(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<DonorSummary> {
    debug!(donor = %name, "donor summary");
    let txs = {
        let name = name.clone();
        with_store(&state, move |s| s.transactions_for_donor(&name)).await?
    };
    Ok(Json(donor_summary(&name, &txs)))
}

pub async fn donor_transactions(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<Transaction>> {
    Ok(Json(
        with_store(&state, move |s| s.transactions_for_donor(&name)).await?,
    ))
}

/// Body of `GET /bond/:bond_id`. A missing bond is reported in-band.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BondDetail {
    Found {
        status: MatchOutcome,
        redeemer: Option<RedemptionRecord>,
        purchaser: Option<PurchaseRecord>,
    },
    Missing {
        message: &'static str,
    },
}

pub async fn bond(
    State(state): State<AppState>,
    Path(bond_id): Path<String>,
) -> ApiResult<BondDetail> {
    let detail = with_store(&state, move |s| {
        let Some(tx) = s.transaction(&bond_id)? else {
            debug!(bond_id = %bond_id, "bond not found");
            return Ok(BondDetail::Missing {
                message: "Bond not found",
            });
        };
        Ok(BondDetail::Found {
            status: tx.outcome,
            redeemer: s.redemption(&bond_id)?,
            purchaser: s.purchase(&bond_id)?,
        })
    })
    .await?;
    Ok(Json(detail))
}
