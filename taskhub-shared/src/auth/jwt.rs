/// Session token signing and verification
///
/// Session tokens are JWTs signed with HS256 (HMAC-SHA256). The claims carry
/// only the user id and the issue time — deliberately no `exp`: a token stays
/// signature-valid forever, and revocation happens by removing it from the
/// owning user's active-token set (see [`crate::models::user::User`]).
/// Decoding therefore disables expiry validation.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::jwt::{create_session_token, verify_session_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let token = create_session_token(user_id, "a-secret-of-at-least-32-bytes!!!")?;
///
/// let claims = verify_session_token(&token, "a-secret-of-at-least-32-bytes!!!")?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature verification or payload decoding failed
    #[error("Failed to verify token: {0}")]
    VerifyError(String),
}

/// Claims embedded in a session token
///
/// # Claims
///
/// - `sub`: Subject (user ID)
/// - `iat`: Issued at (Unix timestamp)
///
/// There is no `exp` claim; token lifetime is governed by the user's
/// active-token set, not by the token itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl SessionClaims {
    /// Creates claims for a freshly issued session
    pub fn new(user_id: Uuid) -> Self {
        Self {
            sub: user_id,
            iat: Utc::now().timestamp(),
        }
    }
}

/// Signs a new session token for the given user
///
/// # Errors
///
/// Returns [`JwtError::CreateError`] if encoding fails.
pub fn create_session_token(user_id: Uuid, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());
    let claims = SessionClaims::new(user_id);

    encode(&header, &claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies a session token's signature and extracts its claims
///
/// Verifies only the HS256 signature and payload shape. It does NOT check
/// expiry (the claims carry none) and it does NOT check revocation — the
/// caller must additionally confirm the token is still in the user's
/// active-token set before trusting it.
///
/// # Errors
///
/// Returns [`JwtError::VerifyError`] if the signature is invalid or the
/// payload is malformed.
pub fn verify_session_token(token: &str, secret: &str) -> Result<SessionClaims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims::<&str>(&[]);

    let data = decode::<SessionClaims>(token, &key, &validation)
        .map_err(|e| JwtError::VerifyError(format!("Token verification failed: {}", e)))?;

    Ok(data.claims)
}
