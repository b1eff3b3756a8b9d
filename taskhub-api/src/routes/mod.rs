/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Signup, login, sessions, profile, avatar
/// - `tasks`: Owner-scoped task CRUD

use crate::error::ApiError;
use serde_json::{Map, Value};
use validator::ValidationErrors;

pub mod health;
pub mod tasks;
pub mod users;

/// Rejects an update body containing any key outside the allowlist
///
/// Checked before any deserialization or mutation, so a single disallowed
/// key rejects the whole request.
pub(crate) fn ensure_allowlisted<'a>(
    keys: impl Iterator<Item = &'a String>,
    allowed: &[&str],
) -> Result<(), ApiError> {
    for key in keys {
        if !allowed.contains(&key.as_str()) {
            return Err(ApiError::BadRequest("invalid update names".to_string()));
        }
    }
    Ok(())
}

/// Rejects an update body that nulls out any field
///
/// Every updatable field is required on its record, so an explicit JSON
/// null can never be applied. Without this check a null would deserialize
/// into an absent field and silently turn the update into a no-op.
pub(crate) fn ensure_no_nulls(payload: &Map<String, Value>) -> Result<(), ApiError> {
    for (key, value) in payload {
        if value.is_null() {
            return Err(ApiError::BadRequest(format!("{} must not be null", key)));
        }
    }
    Ok(())
}

/// Flattens validator errors into the single-message wire format
pub(crate) fn validation_error(errors: ValidationErrors) -> ApiError {
    let message = errors
        .field_errors()
        .iter()
        .flat_map(|(_, errors)| errors.iter())
        .filter_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "validation failed".to_string());

    ApiError::BadRequest(message)
}
