//! Goal API endpoints

use api_types::goal::GoalUpsert;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

use crate::{ServerError, server::ServerState};
use engine::{goals, users};

fn to_input(payload: GoalUpsert) -> Result<goals::GoalInput, ServerError> {
    let status = match payload.status {
        Some(raw) => goals::GoalStatus::try_from(raw.as_str())?,
        None => goals::GoalStatus::InProgress,
    };
    Ok(goals::GoalInput {
        name: payload.name,
        target_amount: payload.target_amount,
        current_amount: payload.current_amount.unwrap_or(Decimal::ZERO),
        image_url: payload.image_url,
        deadline: payload.deadline,
        status,
        account_id: payload.account_id,
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<goals::GoalView>>, ServerError> {
    let goals = state.ledger.goals(user.id).await?;
    Ok(Json(goals))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<goals::Model>, ServerError> {
    let goal = state.ledger.goal(user.id, id).await?;
    Ok(Json(goal))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalUpsert>,
) -> Result<(StatusCode, Json<goals::GoalView>), ServerError> {
    let goal = state.ledger.create_goal(user.id, to_input(payload)?).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<GoalUpsert>,
) -> Result<Json<goals::GoalView>, ServerError> {
    let goal = state
        .ledger
        .update_goal(user.id, id, to_input(payload)?)
        .await?;
    Ok(Json(goal))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_goal(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
