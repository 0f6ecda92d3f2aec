//! Budget API endpoints

use api_types::budget::{BudgetListQuery, BudgetNew};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{budgets, users};

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<BudgetListQuery>,
) -> Result<Json<Vec<budgets::BudgetProgress>>, ServerError> {
    let rows = state.ledger.budgets(user.id, query.month, query.year).await?;
    Ok(Json(rows))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<budgets::Model>), ServerError> {
    if !(1..=12).contains(&payload.month) {
        return Err(ServerError::Generic("Invalid month".to_string()));
    }
    let budget = state
        .ledger
        .create_budget(
            user.id,
            payload.amount,
            payload.month,
            payload.year,
            payload.category_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_budget(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
