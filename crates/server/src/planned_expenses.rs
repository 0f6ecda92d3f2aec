//! Planned-expense API endpoints

use api_types::planned_expense::{PlannedExpenseListQuery, PlannedExpenseNew, PlannedExpensePatch};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{planned_expenses, users};

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<PlannedExpenseListQuery>,
) -> Result<Json<Vec<planned_expenses::Model>>, ServerError> {
    let status = match query.status {
        Some(raw) => Some(planned_expenses::PlannedStatus::try_from(raw.as_str())?),
        None => None,
    };
    let rows = state
        .ledger
        .planned_expenses(user.id, query.month, query.year, status)
        .await?;
    Ok(Json(rows))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PlannedExpenseNew>,
) -> Result<(StatusCode, Json<planned_expenses::Model>), ServerError> {
    let row = state
        .ledger
        .create_planned_expense(
            user.id,
            planned_expenses::NewPlannedExpense {
                amount: payload.amount,
                date: payload.date,
                description: payload.description,
                category_id: payload.category_id,
                account_id: payload.account_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<PlannedExpensePatch>,
) -> Result<Json<planned_expenses::Model>, ServerError> {
    let status = match payload.status {
        Some(raw) => Some(planned_expenses::PlannedStatus::try_from(raw.as_str())?),
        None => None,
    };
    let row = state
        .ledger
        .update_planned_expense(
            user.id,
            id,
            planned_expenses::PlannedExpenseUpdate {
                amount: payload.amount,
                date: payload.date,
                description: payload.description,
                category_id: payload.category_id,
                account_id: payload.account_id,
                status,
            },
        )
        .await?;
    Ok(Json(row))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_planned_expense(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn execute(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<planned_expenses::Model>, ServerError> {
    let row = state.ledger.execute_planned_expense(user.id, id).await?;
    Ok(Json(row))
}
