//! Category API endpoints

use api_types::category::CategoryUpsert;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{categories, users};

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<categories::Model>>, ServerError> {
    let categories = state.ledger.categories(user.id).await?;
    Ok(Json(categories))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryUpsert>,
) -> Result<(StatusCode, Json<categories::Model>), ServerError> {
    let kind = categories::CategoryKind::try_from(payload.kind.as_str())?;
    let category = state
        .ledger
        .create_category(user.id, payload.name, kind)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryUpsert>,
) -> Result<Json<categories::Model>, ServerError> {
    let kind = categories::CategoryKind::try_from(payload.kind.as_str())?;
    let category = state
        .ledger
        .update_category(user.id, id, payload.name, kind)
        .await?;
    Ok(Json(category))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_category(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
