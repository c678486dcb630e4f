/// Configuration management for the API server
///
/// Loads configuration from environment variables into a typed struct.
/// Everything is resolved once at startup; a missing required variable
/// aborts the process.
///
/// # Environment variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `JWT_SECRET`: token-signing secret, at least 32 bytes (required)
/// - `CORS_ORIGIN`: the single allowed CORS origin (required)
/// - `PORT`: port to bind to (default: 5001)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `RUST_LOG`: log filter (default: info-level for this crate)

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token signing configuration
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// The single origin allowed by CORS
    pub cors_origin: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub jwt_secret: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails
    /// to parse. Startup treats any such error as fatal.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env if present (development convenience)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse::<u16>()?;

        let cors_origin = env::var("CORS_ORIGIN")
            .map_err(|_| anyhow::anyhow!("CORS_ORIGIN environment variable is required"))?;

        let url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origin,
            },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            auth: AuthConfig { jwt_secret },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
