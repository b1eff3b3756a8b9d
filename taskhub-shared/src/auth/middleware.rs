/// Session authentication middleware for Axum
///
/// Protects routes by resolving a bearer token to a live user session:
///
/// 1. Extract the token from `Authorization: Bearer <token>`
/// 2. Verify its HS256 signature and decode the user-id claim
/// 3. Look up a user whose id matches AND whose active-token set contains
///    this exact token string
/// 4. Attach [`AuthSession`] (resolved user + raw token) to the request
///    extensions and run the next stage
///
/// Step 3 is what makes logout effective: a revoked token still verifies in
/// step 2 but matches no user. Both "token revoked" and "user deleted"
/// collapse into the same failure.
///
/// Every authentication failure produces the same response — 401 with body
/// `{"error": "authentication failed"}` — so callers cannot distinguish a
/// missing header from a revoked session. A store failure during the lookup
/// is the one exception and maps to a bodiless 500.
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Router, routing::get};
/// use taskhub_shared::auth::middleware::AuthSession;
///
/// async fn me(Extension(session): Extension<AuthSession>) -> String {
///     format!("Hello, {}!", session.user.name)
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;

use super::jwt::verify_session_token;
use crate::models::user::User;

/// Authenticated session attached to request extensions
///
/// Carries the resolved user and the raw token string the request presented;
/// single-session logout needs the latter to know which token to revoke.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user
    pub user: User,

    /// The exact token string used for this request
    pub token: String,
}

/// Error type for the session middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Authorization header absent or not valid UTF-8
    #[error("missing credentials")]
    MissingCredentials,

    /// Header present but not of the form `Bearer <token>`
    #[error("malformed authorization header")]
    MalformedHeader,

    /// Signature verification failed or payload was malformed
    #[error("invalid token")]
    InvalidToken,

    /// Token verified but no user holds it (revoked or account deleted)
    #[error("unknown session")]
    UnknownSession,

    /// Store failure during the session lookup
    #[error("database error: {0}")]
    Database(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Database(msg) => {
                tracing::error!("session lookup failed: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            // Deliberately identical for every other failure mode
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "authentication failed" })),
            )
                .into_response(),
        }
    }
}

/// Session authentication middleware
///
/// Validates the bearer token against `secret`, confirms the session is
/// still active in the store, and attaches [`AuthSession`] on success.
///
/// # Errors
///
/// Returns 401 `{"error": "authentication failed"}` when:
/// - the Authorization header is missing or malformed
/// - the token signature does not verify
/// - no user's active-token set contains the token
pub async fn session_auth_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?
        .to_string();

    let claims = verify_session_token(&token, &secret).map_err(|_| AuthError::InvalidToken)?;

    // The token-in-set condition is what turns logout into real revocation
    let user = User::find_by_session(&pool, claims.sub, &token)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?
        .ok_or(AuthError::UnknownSession)?;

    req.extensions_mut().insert(AuthSession { user, token });

    Ok(next.run(req).await)
}
