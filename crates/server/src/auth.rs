//! Registration, login and the current-user probe.
//!
//! Passwords are argon2 hashes; the engine never sees cleartext. Login
//! failures for unknown email and wrong password are indistinguishable.

use api_types::auth::{AuthUser, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::{
    ServerError,
    server::{Claims, ServerState},
};
use engine::users;

const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

fn hash_password(password: &str) -> Result<String, ServerError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            tracing::error!("password hashing failed: {err}");
            ServerError::Generic("Failed to process credentials".to_string())
        })
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn issue_token(state: &ServerState, user: &users::Model) -> Result<String, ServerError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };
    jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &state.jwt.encoding).map_err(
        |err| {
            tracing::error!("token signing failed: {err}");
            ServerError::Generic("Failed to issue token".to_string())
        },
    )
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ServerError> {
    if !payload.email.contains('@') {
        return Err(ServerError::Generic("Invalid email".to_string()));
    }
    if payload.password.len() < 6 {
        return Err(ServerError::Generic(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if payload.name.trim().len() < 2 {
        return Err(ServerError::Generic(
            "Name must be at least 2 characters".to_string(),
        ));
    }
    let currency = payload.currency.unwrap_or_else(|| "IDR".to_string());
    if currency != "IDR" && currency != "USD" {
        return Err(ServerError::Generic("Invalid currency".to_string()));
    }

    let password = hash_password(&payload.password)?;
    let user = state
        .ledger
        .register_user(users::NewUser {
            email: payload.email,
            password,
            name: payload.name,
            currency,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = state.ledger.user_by_email(&payload.email).await?;
    let Some(user) = user else {
        return Err(ServerError::Generic("Invalid credentials".to_string()));
    };
    if !verify_password(&payload.password, &user.password) {
        return Err(ServerError::Generic("Invalid credentials".to_string()));
    }

    let token = issue_token(&state, &user)?;
    Ok(Json(LoginResponse {
        token,
        user: AuthUser {
            id: user.id,
            name: user.name,
            email: user.email,
            currency: user.currency,
        },
    }))
}

pub async fn me(Extension(user): Extension<users::Model>) -> Json<AuthUser> {
    Json(AuthUser {
        id: user.id,
        name: user.name,
        email: user.email,
        currency: user.currency,
    })
}
