//! HTTP-level integration tests for account and session endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_auth, post_json, register, PASSWORD};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registering returns 201 with tokens and the new user.
#[sqlx::test(migrations = "../../db/migrations")]
async fn register_returns_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "alice",
        "email": "Alice@Example.com",
        "password": PASSWORD,
    });

    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["username"], "alice");
    assert_eq!(json["user"]["email"], "alice@example.com");
}

/// A taken username is a 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(&app, "bob").await;

    let body = serde_json::json!({
        "username": "bob",
        "email": "other@example.com",
        "password": PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Passwords under the minimum length are rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn short_password_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "carol",
        "email": "carol@example.com",
        "password": "short",
    });

    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Login / refresh / logout
// ---------------------------------------------------------------------------

/// Correct credentials log in; wrong ones are 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn login_checks_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(&app, "dave").await;

    let ok = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({ "username": "dave", "password": PASSWORD }),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);

    let bad = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": "dave", "password": "not-the-password" }),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
}

/// A refresh token can be used exactly once.
#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let login = post_json(
        app.clone(),
        "/api/v1/auth/register",
        serde_json::json!({
            "username": "erin",
            "email": "erin@example.com",
            "password": PASSWORD,
        }),
    )
    .await;
    let refresh_token = body_json(login).await["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let first = post_json(app.clone(), "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let json = body_json(first).await;
    assert_ne!(json["refresh_token"].as_str().unwrap(), refresh_token);

    let reused = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
}

/// `me` returns the caller; without a token it is 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn me_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "frank").await;

    let response = get_auth(app.clone(), "/api/v1/auth/me", &user.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], user.id);

    let anonymous = get(app, "/api/v1/auth/me").await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes refresh tokens.
#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_sessions(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        serde_json::json!({
            "username": "grace",
            "email": "grace@example.com",
            "password": PASSWORD,
        }),
    )
    .await;
    let json = body_json(response).await;
    let access = json["access_token"].as_str().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap();

    let logout = post_auth(app.clone(), "/api/v1/auth/logout", access).await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);

    let after = post_json(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}
