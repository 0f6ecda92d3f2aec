use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    accounts, auth, backup, budgets, categories, dashboard, debts, goals, planned_expenses,
    transactions,
};
use engine::Ledger;

/// Bearer token claims. `sub` is the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Ledger,
    pub jwt: Arc<JwtKeys>,
}

/// Verify the bearer token and confirm the user row still exists, then
/// hand the user model to the handlers as an extension.
async fn require_auth(
    bearer: TypedHeader<Authorization<Bearer>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = jsonwebtoken::decode::<Claims>(
        bearer.token(),
        &state.jwt.decoding,
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user = state
        .ledger
        .user(token.claims.sub)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/accounts",
            get(accounts::list).post(accounts::create),
        )
        .route(
            "/api/accounts/{id}",
            get(accounts::get).put(accounts::update).delete(accounts::remove),
        )
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/categories/{id}",
            axum::routing::put(categories::update).delete(categories::remove),
        )
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/api/transactions/{id}", delete(transactions::remove))
        .route("/api/budgets", get(budgets::list).post(budgets::create))
        .route("/api/budgets/{id}", delete(budgets::remove))
        .route("/api/goals", get(goals::list).post(goals::create))
        .route(
            "/api/goals/{id}",
            get(goals::get).put(goals::update).delete(goals::remove),
        )
        .route("/api/debts", get(debts::list).post(debts::create))
        .route(
            "/api/debts/{id}",
            axum::routing::put(debts::update).delete(debts::remove),
        )
        .route(
            "/api/planned-expenses",
            get(planned_expenses::list).post(planned_expenses::create),
        )
        .route(
            "/api/planned-expenses/{id}",
            axum::routing::put(planned_expenses::update).delete(planned_expenses::remove),
        )
        .route(
            "/api/planned-expenses/{id}/execute",
            post(planned_expenses::execute),
        )
        .route("/api/dashboard", get(dashboard::stats))
        .route("/api/backup/export", get(backup::export))
        .route("/api/backup/restore", post(backup::restore))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}

pub async fn run_with_listener(
    ledger: Ledger,
    jwt_secret: &[u8],
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        ledger,
        jwt: Arc::new(JwtKeys::new(jwt_secret)),
    };

    axum::serve(listener, router(state)).await
}
