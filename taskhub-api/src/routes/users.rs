/// User account, session, profile, and avatar handlers
///
/// Signup and login issue a fresh session token each; the token lands in the
/// user's active set, which is what the auth middleware checks. Profile
/// routes operate on the already-authenticated user from request extensions
/// and never take an id from the path — the avatar fetch route is the one
/// exception, and the one public read.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{ensure_allowlisted, ensure_no_nulls, validation_error},
};
use axum::{
    extract::{Extension, Multipart, Path, State},
    http::{header, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use taskhub_shared::{
    auth::{
        jwt::create_session_token,
        middleware::AuthSession,
        password::{hash_password, validate_password_policy, verify_password},
    },
    images::normalize_avatar,
    models::{
        task::Task,
        user::{CreateUser, UpdateUser, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Fields a profile update is allowed to touch
const USER_UPDATE_FIELDS: &[&str] = &["name", "email", "password", "age"];

/// Maximum accepted avatar upload size, in bytes
pub const AVATAR_MAX_BYTES: usize = 1_000_000;

const AVATAR_UPLOAD_HINT: &str = "please upload a jpg, jpeg or png image";

/// Request body for signup
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "email is invalid"))]
    pub email: String,

    /// Plaintext password (hashed before storage)
    pub password: String,

    /// Age in years (defaults to 0)
    #[serde(default)]
    #[validate(range(min = 0, message = "age must be a positive number"))]
    pub age: i32,
}

impl SignupRequest {
    /// Trims name and password, trims and lowercases email
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.password = self.password.trim().to_string();
    }
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Plaintext password
    pub password: String,
}

/// Fields accepted by a profile update, after allowlist filtering
#[derive(Debug, Deserialize, Validate)]
struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    name: Option<String>,

    #[validate(email(message = "email is invalid"))]
    email: Option<String>,

    password: Option<String>,

    #[validate(range(min = 0, message = "age must be a positive number"))]
    age: Option<i32>,
}

impl UpdateProfileRequest {
    fn normalize(&mut self) {
        if let Some(name) = &self.name {
            self.name = Some(name.trim().to_string());
        }
        if let Some(email) = &self.email {
            self.email = Some(email.trim().to_lowercase());
        }
        if let Some(password) = &self.password {
            self.password = Some(password.trim().to_string());
        }
    }
}

/// Response body carrying a user together with a fresh session token
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The account (credentials and token set excluded by serialization)
    pub user: User,

    /// Newly issued session token
    pub token: String,
}

/// POST /users
///
/// Creates an account, starts a first session, and fires the welcome email.
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    payload.normalize();
    payload.validate().map_err(validation_error)?;
    validate_password_policy(&payload.password).map_err(ApiError::BadRequest)?;

    let password_hash = hash_password(&payload.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            age: payload.age,
        },
    )
    .await?;

    let token = create_session_token(user.id, state.jwt_secret())?;
    User::push_token(&state.db, user.id, &token).await?;

    state.mailer.send_welcome(&user.email, &user.name);

    tracing::info!(user_id = %user.id, "User signed up");

    Ok((StatusCode::CREATED, Json(SessionResponse { user, token })))
}

/// POST /users/login
///
/// Verifies credentials and starts a new session alongside any existing
/// ones. Unknown email and wrong password produce the same response.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::BadRequest("unable to login".to_string()))?;

    if !verify_password(payload.password.trim(), &user.password_hash)? {
        return Err(ApiError::BadRequest("unable to login".to_string()));
    }

    let token = create_session_token(user.id, state.jwt_secret())?;
    User::push_token(&state.db, user.id, &token).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(SessionResponse { user, token }))
}

/// POST /users/logout
///
/// Revokes the session used to make this request; other sessions stay live.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<StatusCode> {
    User::remove_token(&state.db, session.user.id, &session.token).await?;

    Ok(StatusCode::OK)
}

/// POST /users/logoutall
///
/// Revokes every session the user holds, including this one.
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<StatusCode> {
    User::clear_tokens(&state.db, session.user.id).await?;

    Ok(StatusCode::OK)
}

/// GET /users/me
pub async fn get_profile(Extension(session): Extension<AuthSession>) -> Json<User> {
    Json(session.user)
}

/// PATCH /users/me
///
/// Partially updates the authenticated user's profile. Any key outside the
/// allowlist rejects the whole request before anything is written.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Json(payload): Json<Map<String, Value>>,
) -> ApiResult<Json<User>> {
    ensure_allowlisted(payload.keys(), USER_UPDATE_FIELDS)?;
    ensure_no_nulls(&payload)?;

    let mut update: UpdateProfileRequest = serde_json::from_value(Value::Object(payload))
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    update.normalize();
    update.validate().map_err(validation_error)?;

    let password_hash = match update.password {
        Some(password) => {
            validate_password_policy(&password).map_err(ApiError::BadRequest)?;
            Some(hash_password(&password)?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        session.user.id,
        UpdateUser {
            name: update.name,
            email: update.email,
            password_hash,
            age: update.age,
        },
    )
    .await?
    .ok_or(ApiError::NotFound)?;

    Ok(Json(user))
}

/// DELETE /users/me
///
/// Deletes the account, then sweeps its tasks, then fires the farewell
/// email. The sweep runs after the user row is gone; a crash in between
/// leaves orphaned tasks rather than a half-deleted account.
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<Json<User>> {
    let user = session.user;

    let deleted = User::delete(&state.db, user.id).await?;
    if deleted {
        let swept = Task::delete_by_owner(&state.db, user.id).await?;
        tracing::info!(user_id = %user.id, tasks_removed = swept, "User account deleted");

        state.mailer.send_farewell(&user.email, &user.name);
    }

    Ok(Json(user))
}

/// POST /users/me/avatar
///
/// Accepts a multipart upload in the `avatar` field, normalizes it to a
/// 250×250 PNG, and stores it on the account (replacing any previous one).
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    mut multipart: Multipart,
) -> ApiResult<StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let looks_like_image = field
            .file_name()
            .map(has_image_extension)
            .unwrap_or(false)
            && field
                .content_type()
                .map(is_image_content_type)
                .unwrap_or(false);
        if !looks_like_image {
            return Err(ApiError::BadRequest(AVATAR_UPLOAD_HINT.to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        if bytes.len() > AVATAR_MAX_BYTES {
            return Err(ApiError::BadRequest(
                "image must be at most 1 MB".to_string(),
            ));
        }

        let normalized = normalize_avatar(&bytes)?;
        User::set_avatar(&state.db, session.user.id, &normalized).await?;

        return Ok(StatusCode::OK);
    }

    Err(ApiError::BadRequest(AVATAR_UPLOAD_HINT.to_string()))
}

/// DELETE /users/me/avatar
pub async fn delete_avatar(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<StatusCode> {
    let cleared = User::clear_avatar(&state.db, session.user.id).await?;
    if !cleared {
        return Err(ApiError::BadRequest("no avatar uploaded".to_string()));
    }

    Ok(StatusCode::OK)
}

/// GET /users/:id/avatar
///
/// Public fetch of a stored avatar as `image/png`. A malformed id behaves
/// exactly like a missing avatar here: there is nothing to protect.
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<([(header::HeaderName, &'static str); 1], Vec<u8>)> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound)?;

    let avatar = User::find_avatar(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], avatar))
}

fn has_image_extension(filename: &str) -> bool {
    let lowered = filename.to_lowercase();
    lowered.ends_with(".jpg") || lowered.ends_with(".jpeg") || lowered.ends_with(".png")
}

fn is_image_content_type(content_type: &str) -> bool {
    matches!(content_type, "image/jpeg" | "image/jpg" | "image/png")
}
