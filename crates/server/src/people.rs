//! People API endpoints

use api_types::people::PeopleResponse;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// Every distinct person appearing in the ledger, sorted alphabetically.
pub async fn list(State(state): State<ServerState>) -> Result<Json<PeopleResponse>, ServerError> {
    let people = state.engine.people().await?;
    Ok(Json(PeopleResponse { people }))
}
