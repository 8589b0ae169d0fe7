//! Settlements API endpoints

use api_types::settlement::{BalancesResponse, SettlementView, SettlementsResponse};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// Net balances per person over the full expense history.
pub async fn balances(
    State(state): State<ServerState>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state.engine.balances().await?;
    Ok(Json(BalancesResponse { balances }))
}

/// The greedy settlement plan that zeroes all current balances.
pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<SettlementsResponse>, ServerError> {
    let settlements = state
        .engine
        .settlements()
        .await?
        .into_iter()
        .map(|tx| SettlementView {
            payer: tx.payer,
            receiver: tx.receiver,
            amount: tx.amount,
        })
        .collect();
    Ok(Json(SettlementsResponse { settlements }))
}
