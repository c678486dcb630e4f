/// Token authentication middleware for Axum
///
/// Protected route groups are gated by [`token_auth`]: it reads the token
/// from the `x-auth-token` request header, validates it, and injects an
/// [`AuthUser`] into the request extensions for the handler. Failures never
/// reach the handler; they answer 401 with the standard JSON error body.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use opsdesk_shared::auth::middleware::{token_auth, AuthUser};
///
/// async fn handler(Extension(auth): Extension<AuthUser>) -> String {
///     format!("caller: {}", auth.user_id)
/// }
///
/// let secret = "secret".to_string();
/// let app: Router = Router::new()
///     .route("/protected", get(handler))
///     .layer(middleware::from_fn(move |req, next| {
///         token_auth(secret.clone(), req, next)
///     }));
/// ```

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::token::{validate_token, TokenError};

/// Name of the request header carrying the token.
pub const AUTH_HEADER: &str = "x-auth-token";

/// Authenticated caller context added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor. It carries only
/// the verified user id; there is no role or scope information to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Verified user id embedded in the presented token
    pub user_id: Uuid,
}

/// Error type for the authentication gate
#[derive(Debug)]
pub enum AuthError {
    /// The x-auth-token header is absent
    MissingToken,

    /// Signature, expiry, or issuer check failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "No token, authorization denied".to_string(),
            AuthError::InvalidToken(msg) => msg,
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "message": message })),
        )
            .into_response()
    }
}

/// Token authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if the header is missing, or if signature
/// verification or the expiry check fails.
pub async fn token_auth(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let claims = validate_token(token, &secret).map_err(|e| match e {
        TokenError::Expired => AuthError::InvalidToken("Token has expired".to_string()),
        _ => AuthError::InvalidToken("Token is not valid".to_string()),
    })?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
    });

    Ok(next.run(req).await)
}
