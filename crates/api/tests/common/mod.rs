#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use challenge_api::auth::jwt::JwtConfig;
use challenge_api::config::ServerConfig;
use challenge_api::routes;
use challenge_api::state::AppState;
use challenge_events::EventBus;

/// Secret accepted by the cron endpoint in tests.
pub const CRON_SECRET: &str = "test-cron-secret";

/// Password used for every test account.
pub const PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
///
/// The in-process sweep and push delivery are disabled so tests drive the
/// prompt cycle explicitly.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        cron_secret: Some(CRON_SECRET.to_string()),
        prompt_queue_interval_secs: 0,
        push_gateway_url: None,
    }
}

/// Build the full application router with all middleware layers.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_with_bus(pool, Arc::new(EventBus::default()))
}

/// Same as [`build_test_app`] with a caller-owned event bus.
pub fn build_app_with_bus(pool: PgPool, event_bus: Arc<EventBus>) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        event_bus,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A registered user and their access token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

/// Register `username` through the API.
pub async fn register(app: &Router, username: &str) -> TestUser {
    let body = serde_json::json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": PASSWORD,
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    TestUser {
        id: json["user"]["id"].as_i64().unwrap(),
        token: json["access_token"].as_str().unwrap().to_string(),
    }
}

/// Create a league owned by `owner` and return its JSON.
pub async fn create_league(
    app: &Router,
    owner: &TestUser,
    body: serde_json::Value,
) -> serde_json::Value {
    let response = post_json_auth(app.clone(), "/api/v1/leagues", body, &owner.token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Join a league via its invite code.
pub async fn join_league(app: &Router, user: &TestUser, league: &serde_json::Value) {
    let body = serde_json::json!({ "invite_code": league["invite_code"] });
    let response = post_json_auth(app.clone(), "/api/v1/leagues/join", body, &user.token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Schedule a prompt and return its id.
pub async fn add_prompt(app: &Router, owner: &TestUser, league_id: i64, text: &str) -> i64 {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/leagues/{league_id}/prompts"),
        serde_json::json!({ "text": text }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Submit a response for `user` and return its id.
pub async fn submit(app: &Router, user: &TestUser, prompt_id: i64, image: &str) -> i64 {
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/prompts/{prompt_id}/response"),
        serde_json::json!({ "image_url": format!("https://img.example.com/{image}.jpg") }),
        &user.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Force one cycle step as the league owner.
pub async fn force_transition(app: &Router, owner: &TestUser, league_id: i64) -> serde_json::Value {
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/leagues/{league_id}/transition"),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}
