use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Ledger;
use migration::MigratorTrait;
use server::{JwtKeys, ServerState, router};

const SECRET: &[u8] = b"test-secret";

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let state = ServerState {
        ledger: Ledger::new(db),
        jwt: Arc::new(JwtKeys::new(SECRET)),
    };
    router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(mut request: Request<Body>, token: &str) -> Request<Body> {
    let value = format!("Bearer {token}");
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, value.parse().unwrap());
    request
}

/// Register and log in, returning the bearer token.
async fn register_and_login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "email": "alice@example.com",
                "password": "secret123",
                "name": "Alice",
                "currency": "IDR"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "alice@example.com", "password": "secret123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_and_me() {
    let app = app().await;
    let token = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(authed(
            Request::builder()
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["currency"], "IDR");
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = app().await;
    register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "alice@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/accounts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    // Missing authorization header is rejected by the header extractor.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(authed(
            Request::builder()
                .uri("/api/accounts")
                .body(Body::empty())
                .unwrap(),
            "not-a-jwt",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_create_and_list() {
    let app = app().await;
    let token = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(authed(
            post_json(
                "/api/accounts",
                json!({ "name": "Bank", "type": "BANK", "balance": 1000 }),
            ),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed(
            Request::builder()
                .uri("/api/accounts")
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Bank"));
    assert!(names.contains(&"Wallet"));
}

#[tokio::test]
async fn same_account_transfer_is_a_bad_request() {
    let app = app().await;
    let token = register_and_login(&app).await;

    // Grab the seeded wallet id and a category id.
    let accounts = body_json(
        app.clone()
            .oneshot(authed(
                Request::builder()
                    .uri("/api/accounts")
                    .body(Body::empty())
                    .unwrap(),
                &token,
            ))
            .await
            .unwrap(),
    )
    .await;
    let wallet_id = accounts[0]["id"].as_i64().unwrap();

    let categories = body_json(
        app.clone()
            .oneshot(authed(
                Request::builder()
                    .uri("/api/categories")
                    .body(Body::empty())
                    .unwrap(),
                &token,
            ))
            .await
            .unwrap(),
    )
    .await;
    let category_id = categories[0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            post_json(
                "/api/transactions",
                json!({
                    "amount": 100,
                    "date": "2026-08-28T00:00:00Z",
                    "type": "TRANSFER",
                    "categoryId": category_id,
                    "accountId": wallet_id,
                    "targetAccountId": wallet_id
                }),
            ),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Cannot transfer to the same account");
}

#[tokio::test]
async fn dashboard_uses_wire_casing() {
    let app = app().await;
    let token = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(authed(
            Request::builder()
                .uri("/api/dashboard")
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.get("netWorth").is_some());
    assert!(body.get("wealthLevel").is_some());
    assert!(body.get("totalCashHistory").is_some());
    assert_eq!(body["wealthLevel"], "BERTAHAN");
}

#[tokio::test]
async fn planned_expense_patch_distinguishes_null_from_absent() {
    let app = app().await;
    let token = register_and_login(&app).await;

    let accounts = body_json(
        app.clone()
            .oneshot(authed(
                Request::builder()
                    .uri("/api/accounts")
                    .body(Body::empty())
                    .unwrap(),
                &token,
            ))
            .await
            .unwrap(),
    )
    .await;
    let wallet_id = accounts[0]["id"].as_i64().unwrap();

    let categories = body_json(
        app.clone()
            .oneshot(authed(
                Request::builder()
                    .uri("/api/categories")
                    .body(Body::empty())
                    .unwrap(),
                &token,
            ))
            .await
            .unwrap(),
    )
    .await;
    let category_id = categories[0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            post_json(
                "/api/planned-expenses",
                json!({
                    "amount": 50000,
                    "date": "2026-09-01T00:00:00Z",
                    "categoryId": category_id,
                    "accountId": wallet_id
                }),
            ),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let row = body_json(response).await;
    let id = row["id"].as_i64().unwrap();
    let uri = format!("/api/planned-expenses/{id}");

    // Absent accountId leaves the link alone.
    let patched = body_json(
        app.clone()
            .oneshot(authed(put_json(&uri, json!({ "amount": "75000" })), &token))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(patched["accountId"].as_i64(), Some(wallet_id));

    // Explicit null detaches it.
    let patched = body_json(
        app.clone()
            .oneshot(authed(put_json(&uri, json!({ "accountId": null })), &token))
            .await
            .unwrap(),
    )
    .await;
    assert!(patched["accountId"].is_null());

    let response = app
        .clone()
        .oneshot(authed(
            post_json(&format!("{uri}/execute"), json!({})),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed(
            post_json(&format!("{uri}/execute"), json!({})),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Planned expense already executed");
}

#[tokio::test]
async fn backup_export_then_restore() {
    let app = app().await;
    let token = register_and_login(&app).await;

    let snapshot = body_json(
        app.clone()
            .oneshot(authed(
                Request::builder()
                    .uri("/api/backup/export")
                    .body(Body::empty())
                    .unwrap(),
                &token,
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(snapshot["version"], 1);

    let response = app
        .clone()
        .oneshot(authed(post_json("/api/backup/restore", snapshot), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Data restored successfully");
}
