//! Common test utilities for integration tests
//!
//! Two ways to get an app under test:
//!
//! - [`surface_app`] builds the real router over a lazy (never-connected)
//!   pool. Good for everything that resolves before touching the database:
//!   the auth gate, request validation, the stub resources, liveness.
//! - [`TestContext::new`] connects to `TEST_DATABASE_URL`, runs migrations,
//!   and builds the router over the live pool. Tests using it skip
//!   themselves when the variable is unset.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use opsdesk_api::{
    app::{build_router, AppState},
    config::{ApiConfig, AuthConfig, Config, DatabaseConfig},
};
use opsdesk_shared::auth::token::{issue_token, Claims};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;
use uuid::Uuid;

/// Signing secret used by every test token (32+ bytes)
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Builds a complete test configuration around the given database URL
pub fn test_config(database_url: &str) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origin: "http://localhost:3000".to_string(),
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
        },
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
        },
    }
}

/// The real router over a pool that never connects
///
/// Only usable for requests that are answered before any query runs.
pub fn surface_app() -> Router {
    let config = test_config("postgresql://127.0.0.1:1/unreachable");
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("lazy pool construction should not fail");

    build_router(AppState::new(pool, config)).expect("router should build")
}

/// Test context over a live database
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Connects to `TEST_DATABASE_URL` and prepares the schema
    ///
    /// Returns `None` when the variable is unset so callers can skip.
    pub async fn new() -> Option<Self> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;

        let db = PgPool::connect(&url)
            .await
            .expect("should connect to the test database");
        opsdesk_shared::db::migrations::run_migrations(&db)
            .await
            .expect("migrations should apply");

        let config = test_config(&url);
        let app = build_router(AppState::new(db.clone(), config)).expect("router should build");

        Some(Self { db, app })
    }
}

/// Issues a token for an arbitrary user id with the test secret
pub fn token_for(user_id: Uuid) -> String {
    issue_token(&Claims::new(user_id), TEST_SECRET).expect("token should issue")
}

/// Builds a request with an optional token and optional JSON body
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("x-auth-token", token);
    }

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

/// Sends a request through the router and returns the response
pub async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("infallible service")
}

/// Reads a response body as JSON
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Reads a response body as text
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8_lossy(&bytes).to_string()
}

/// Registers a fresh user through the API and returns (email, token)
pub async fn register_user(app: &Router, password: &str) -> (String, String) {
    let email = format!("test-{}@example.com", Uuid::new_v4());

    let response = send(
        app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "name": "Test User",
                "email": email,
                "password": password,
            })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["token"].as_str().expect("token in response").to_string();

    (email, token)
}
