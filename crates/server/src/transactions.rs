//! Transaction API endpoints

use api_types::transaction::{TransactionListQuery, TransactionNew};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{transactions, users};

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<transactions::Model>>, ServerError> {
    let kind = match query.kind {
        Some(raw) => Some(transactions::TransactionKind::try_from(raw.as_str())?),
        None => None,
    };
    let filter = transactions::TransactionFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        kind,
        category_id: query.category_id,
    };

    let rows = state.ledger.transactions(user.id, filter).await?;
    Ok(Json(rows))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<transactions::Model>), ServerError> {
    let kind = transactions::TransactionKind::try_from(payload.kind.as_str())?;
    let new = transactions::NewTransaction {
        amount: payload.amount,
        date: payload.date,
        description: payload.description,
        kind,
        category_id: payload.category_id,
        account_id: payload.account_id,
        target_account_id: payload.target_account_id,
        goal_id: payload.goal_id,
        debt_id: payload.debt_id,
    };

    let row = state.ledger.create_transaction(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_transaction(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
