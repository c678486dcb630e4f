//! # opsdesk API server
//!
//! REST backend for tracking IT assets alongside users, projects, tasks,
//! and shift handoffs. Token-authenticated CRUD over PostgreSQL.
//!
//! Startup is fail-fast: a missing configuration variable, an unreachable
//! database, or a failed migration terminates the process with a non-zero
//! exit status. There is no retry loop and no degraded mode.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p opsdesk-api
//! ```

use anyhow::Context;
use opsdesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use opsdesk_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig as PoolConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opsdesk_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "opsdesk API server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("failed to load configuration")?;

    let pool = create_pool(PoolConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("failed to connect to the database")?;

    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let state = AppState::new(pool, config.clone());
    let app = build_router(state)?;

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;

    Ok(())
}
