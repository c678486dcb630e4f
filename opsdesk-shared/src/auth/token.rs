/// Signed token generation and validation
///
/// Tokens are signed with HS256 (HMAC-SHA256) and prove a caller's identity
/// to protected routes without any server-side session state.
///
/// # Claims
///
/// - `sub`: the user id, the only identity claim
/// - `iss`: always "opsdesk"
/// - `iat` / `nbf` / `exp`: standard timestamps
///
/// Every token expires a fixed 5 hours after issue.
///
/// # Example
///
/// ```
/// use opsdesk_shared::auth::token::{issue_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let secret = "test-secret-key-at-least-32-bytes-long";
///
/// let token = issue_token(&Claims::new(user_id), secret)?;
/// let claims = validate_token(&token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer embedded in and required of every token.
const ISSUER: &str = "opsdesk";

/// Fixed lifetime of an issued token.
pub const TOKEN_TTL_HOURS: i64 = 5;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Token claims
///
/// The payload carries only the user identifier; there is no role or scope
/// claim, so possession of any valid token grants access to every protected
/// route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: Uuid,

    /// Issuer - always "opsdesk"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for a user with the fixed 5-hour expiry.
    pub fn new(user_id: Uuid) -> Self {
        Self::with_expiration(user_id, Duration::hours(TOKEN_TTL_HOURS))
    }

    /// Creates claims with a custom expiration (used by tests to produce
    /// already-expired tokens).
    pub fn with_expiration(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs a token from claims
///
/// # Errors
///
/// Returns `TokenError::CreateError` if encoding fails.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, the expiry, the not-before timestamp, and the
/// issuer.
///
/// # Errors
///
/// Returns `TokenError::Expired` for expired tokens and
/// `TokenError::ValidationError` for any other failure (bad signature,
/// malformed token, wrong issuer).
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
