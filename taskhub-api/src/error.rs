/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. All handlers return
/// `Result<T, ApiError>` which converts automatically at the route boundary;
/// nothing propagates to a generic unhandled-error path.
///
/// # Wire contract
///
/// - 400 responses carry `{"error": "<message>"}`
/// - 404 and 500 responses carry an empty body (500 details are logged,
///   never exposed)
/// - 401 responses are produced by the auth middleware
///   ([`taskhub_shared::auth::middleware::AuthError`]), not by this type
///
/// # Example
///
/// ```
/// use taskhub_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::BadRequest("invalid update names".to_string()))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): validation failure, disallowed update field,
    /// bad login credentials, unusable attachment
    BadRequest(String),

    /// Bad request (400): path id does not parse as a store identifier.
    /// Distinct from [`ApiError::NotFound`] on the wire ("invalid id").
    InvalidId,

    /// Not found (404): no record matches, or it belongs to someone else —
    /// the two are deliberately indistinguishable
    NotFound,

    /// Internal server error (500): unexpected store or collaborator failure
    Internal(String),
}

/// Error response body for 400-class failures
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message
    pub error: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::InvalidId => write!(f, "Bad request: invalid id"),
            ApiError::NotFound => write!(f, "Not found"),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: msg })).into_response()
            }
            ApiError::InvalidId => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "invalid id".to_string(),
                }),
            )
                .into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Convert sqlx errors to API errors
///
/// The users email unique constraint is the one store failure a client can
/// cause; it surfaces as a validation-style 400. Everything else is an
/// unexpected store error.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::BadRequest("email already in use".to_string());
                    }
                }
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert token-creation errors to API errors
impl From<taskhub_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: taskhub_shared::auth::jwt::JwtError) -> Self {
        ApiError::Internal(format!("Token operation failed: {}", err))
    }
}

/// Convert password-hashing errors to API errors
impl From<taskhub_shared::auth::password::PasswordError> for ApiError {
    fn from(err: taskhub_shared::auth::password::PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert avatar-processing errors to API errors
///
/// An undecodable upload is the client's fault, not the server's.
impl From<taskhub_shared::images::AvatarError> for ApiError {
    fn from(err: taskhub_shared::images::AvatarError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
