/// Application state and router builder
///
/// Defines the shared application state and assembles the Axum router:
/// public auth routes, the token-gated asset group, the declared-but-stubbed
/// project/task/handoff groups, and the liveness/health endpoints.
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /                       # liveness (public, plaintext)
/// ├── GET  /health                 # health probe (public, JSON)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register       # public
///     │   ├── POST /login          # public
///     │   └── GET  /               # caller's own record (token)
///     ├── /assets/                 # token-gated CRUD
///     │   ├── POST   /
///     │   ├── GET    /
///     │   ├── PUT    /:id
///     │   └── DELETE /:id
///     └── /projects, /tasks, /handoffs   # token-gated, answer 501
/// ```
///
/// # Middleware stack
///
/// CORS restricted to the single configured origin, request tracing, a
/// fixed 30-second per-request deadline, and the token gate applied per
/// route group.

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{any, get, post},
    Router,
};
use opsdesk_shared::auth::middleware::{token_auth, AuthError, AUTH_HEADER};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Fixed per-request deadline. Requests that exceed it answer 408 instead
/// of waiting on the store indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor. The pool
/// is internally reference-counted and the config sits behind an `Arc`, so
/// cloning is cheap. This is the only state shared between requests.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the token-signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Errors
///
/// Returns an error when the configured CORS origin is not a valid header
/// value; startup treats this as fatal.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    use crate::routes;

    let origin: HeaderValue = state.config.api.cors_origin.parse().map_err(|_| {
        anyhow::anyhow!(
            "CORS_ORIGIN is not a valid origin: {}",
            state.config.api.cors_origin
        )
    })?;

    let auth_gate = middleware::from_fn_with_state(state.clone(), token_auth_layer);

    // Auth: register/login are public, the whoami route is gated
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .merge(
            Router::new()
                .route("/", get(routes::auth::me))
                .layer(auth_gate.clone()),
        );

    let asset_routes = Router::new()
        .route(
            "/",
            post(routes::assets::create_asset).get(routes::assets::list_assets),
        )
        .route(
            "/:id",
            axum::routing::put(routes::assets::update_asset)
                .delete(routes::assets::delete_asset),
        )
        .layer(auth_gate.clone());

    // Declared resources without handlers: mounted, gated, answering 501
    // on every verb and subpath
    let project_routes = Router::new()
        .route("/", any(routes::stubs::projects))
        .route("/*rest", any(routes::stubs::projects))
        .layer(auth_gate.clone());

    let task_routes = Router::new()
        .route("/", any(routes::stubs::tasks))
        .route("/*rest", any(routes::stubs::tasks))
        .layer(auth_gate.clone());

    let handoff_routes = Router::new()
        .route("/", any(routes::stubs::handoffs))
        .route("/*rest", any(routes::stubs::handoffs))
        .layer(auth_gate);

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(AUTH_HEADER)]);

    let router = Router::new()
        .route("/", get(routes::health::liveness))
        .route("/health", get(routes::health::health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/assets", asset_routes)
        .nest("/api/projects", project_routes)
        .nest("/api/tasks", task_routes)
        .nest("/api/handoffs", handoff_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors)
        .with_state(state);

    Ok(router)
}

/// Token authentication middleware layer
///
/// Thin adapter handing the configured secret to the shared gate; on
/// success the verified caller id is available to handlers via
/// `Extension<AuthUser>`.
async fn token_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    token_auth(state.jwt_secret().to_string(), req, next).await
}
