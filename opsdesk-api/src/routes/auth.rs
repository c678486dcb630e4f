/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register`: create an account, receive a token
/// - `POST /api/auth/login`: authenticate, receive a token
/// - `GET /api/auth/`: the caller's own record (token required)
///
/// Both token-issuing endpoints return the same `{token}` shape. Login
/// failure is a single fixed response whether the email is unknown or the
/// password is wrong. Argon2 hashing and verification run on the blocking
/// pool so CPU-bound work cannot stall unrelated requests.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AppJson,
};
use axum::{extract::State, Extension, Json};
use opsdesk_shared::{
    auth::{middleware::AuthUser, password, token},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,

    /// Email address, unique across accounts
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Password
    pub password: String,
}

/// Response of both token-issuing endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed token, valid for 5 hours, presented via `x-auth-token`
    pub token: String,
}

/// Register a new account
///
/// # Errors
///
/// - `400 Bad Request`: body fails validation
/// - `409 Conflict`: email already registered (case-insensitive)
/// - `500 Internal Server Error`: store or hashing fault
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let RegisterRequest {
        name,
        email,
        password,
    } = req;

    // CPU-bound: hash off the async runtime
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))??;

    let user = User::create(
        &state.db,
        CreateUser {
            name,
            email,
            password_hash,
        },
    )
    .await?;

    let token = token::issue_token(&token::Claims::new(user.id), state.jwt_secret())?;

    Ok(Json(TokenResponse { token }))
}

/// Authenticate and receive a token
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password; the response is
///   identical in both cases
/// - `500 Internal Server Error`: store or hashing fault
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let password = req.password;
    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))??;

    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = token::issue_token(&token::Claims::new(user.id), state.jwt_secret())?;

    Ok(Json(TokenResponse { token }))
}

/// The caller's own record
///
/// The password hash is excluded from serialization.
///
/// # Errors
///
/// - `404 Not Found`: the id embedded in the token no longer resolves
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
