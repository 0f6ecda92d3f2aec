//! Backup export/restore API endpoints

use api_types::MessageResponse;
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState};
use engine::{Snapshot, users};

pub async fn export(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Snapshot>, ServerError> {
    let snapshot = state.ledger.export_data(user.id).await?;
    Ok(Json(snapshot))
}

pub async fn restore(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.ledger.restore_data(user.id, payload).await?;
    Ok(Json(MessageResponse {
        message: "Data restored successfully".to_string(),
    }))
}
