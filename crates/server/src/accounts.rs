//! Account API endpoints

use api_types::account::AccountUpsert;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

use crate::{ServerError, server::ServerState};
use engine::{accounts, users};

fn to_input(payload: AccountUpsert) -> Result<accounts::AccountInput, ServerError> {
    let kind = accounts::AccountKind::try_from(payload.kind.as_str())?;
    Ok(accounts::AccountInput {
        name: payload.name,
        kind,
        balance: payload.balance.unwrap_or(Decimal::ZERO),
        stock_symbol: payload.stock_symbol,
        quantity: payload.quantity,
        image_url: payload.image_url,
        goal_id: payload.goal_id,
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<accounts::Model>>, ServerError> {
    let accounts = state.ledger.accounts(user.id).await?;
    Ok(Json(accounts))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<accounts::Model>, ServerError> {
    let account = state.ledger.account(user.id, id).await?;
    Ok(Json(account))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountUpsert>,
) -> Result<(StatusCode, Json<accounts::Model>), ServerError> {
    let account = state.ledger.create_account(user.id, to_input(payload)?).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<AccountUpsert>,
) -> Result<Json<accounts::Model>, ServerError> {
    let account = state
        .ledger
        .update_account(user.id, id, to_input(payload)?)
        .await?;
    Ok(Json(account))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_account(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
