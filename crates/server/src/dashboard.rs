//! Dashboard API endpoint

use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState};
use engine::{DashboardStats, users};

pub async fn stats(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardStats>, ServerError> {
    let stats = state.ledger.dashboard(user.id).await?;
    Ok(Json(stats))
}
