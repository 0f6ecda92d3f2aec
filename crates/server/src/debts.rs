//! Debt API endpoints

use api_types::debt::DebtUpsert;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{debts, users};

fn to_input(payload: DebtUpsert) -> Result<debts::DebtInput, ServerError> {
    let kind = debts::DebtKind::try_from(payload.kind.as_str())?;
    let status = match payload.status {
        Some(raw) => debts::DebtStatus::try_from(raw.as_str())?,
        None => debts::DebtStatus::Unpaid,
    };
    Ok(debts::DebtInput {
        person_name: payload.person_name,
        amount: payload.amount,
        kind,
        status,
        due_date: payload.due_date,
        description: payload.description,
        total_installments: payload.total_installments,
        current_installment: payload.current_installment,
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<debts::Model>>, ServerError> {
    let debts = state.ledger.debts(user.id).await?;
    Ok(Json(debts))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DebtUpsert>,
) -> Result<(StatusCode, Json<debts::Model>), ServerError> {
    let debt = state.ledger.create_debt(user.id, to_input(payload)?).await?;
    Ok((StatusCode::CREATED, Json(debt)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<DebtUpsert>,
) -> Result<Json<debts::Model>, ServerError> {
    let debt = state
        .ledger
        .update_debt(user.id, id, to_input(payload)?)
        .await?;
    Ok(Json(debt))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_debt(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
