/// Owner-scoped task CRUD handlers
///
/// Every route runs behind the auth layer and every store operation is
/// scoped to the authenticated owner, so another user's task and a missing
/// task produce identical 404s.
///
/// List query parameters mirror their original string forms exactly:
/// `status` only accepts the literals `true`/`false`, `sortby` only
/// `createdAt:asc`/`createdAt:desc`, and unrecognized values fall back to
/// the unfiltered default rather than erroring.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{ensure_allowlisted, ensure_no_nulls, validation_error},
};
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use taskhub_shared::{
    auth::middleware::AuthSession,
    models::task::{CreateTask, SortOrder, Task, TaskFilter, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

/// Fields a task update is allowed to touch
const TASK_UPDATE_FIELDS: &[&str] = &["description", "status"];

/// Request body for creating a task
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// What needs doing
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,

    /// Completion flag (defaults to false)
    #[serde(default)]
    pub status: bool,
}

/// Fields accepted by a task update, after allowlist filtering
#[derive(Debug, Deserialize, Validate)]
struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "description must not be empty"))]
    description: Option<String>,

    status: Option<bool>,
}

/// Query parameters for listing tasks
///
/// All parameters arrive as raw strings and are parsed leniently by the
/// helpers below.
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// `true` or `false`; anything else means no filter
    pub status: Option<String>,

    /// `createdAt:asc` or `createdAt:desc`; anything else means no order
    pub sortby: Option<String>,

    /// Maximum rows returned; non-numeric or negative means no limit
    pub limit: Option<String>,

    /// Rows skipped; non-numeric or negative means no skip
    pub skip: Option<String>,
}

impl ListTasksQuery {
    fn into_filter(self) -> TaskFilter {
        TaskFilter {
            status: self.status.as_deref().and_then(parse_status_param),
            sort_by_created: self.sortby.as_deref().and_then(parse_sort_param),
            limit: self.limit.as_deref().and_then(parse_page_param),
            skip: self.skip.as_deref().and_then(parse_page_param),
        }
    }
}

/// POST /tasks
///
/// Creates a task owned by the authenticated user. Ownership comes from the
/// session, never from the body.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let description = payload.description.trim().to_string();
    let request = CreateTaskRequest {
        description,
        status: payload.status,
    };
    request.validate().map_err(validation_error)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            description: request.description,
            status: request.status,
            owner_id: session.user.id,
        },
    )
    .await?;

    tracing::debug!(task_id = %task.id, owner_id = %task.owner_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /tasks
///
/// Lists the authenticated user's tasks, with optional filter, sort, and
/// pagination. An empty result is a message object, not an empty array.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Value>> {
    let tasks = Task::list_by_owner(&state.db, session.user.id, query.into_filter()).await?;

    if tasks.is_empty() {
        return Ok(Json(json!({ "message": "no tasks created yet" })));
    }

    Ok(Json(serde_json::to_value(tasks).map_err(|e| {
        ApiError::Internal(format!("Serialization error: {}", e))
    })?))
}

/// GET /tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let task = Task::find_by_id_and_owner(&state.db, id, session.user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(task))
}

/// PATCH /tasks/:id
///
/// Partially updates an owned task. An empty body and a body with a
/// disallowed key are both rejected before anything is written.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    if payload.is_empty() {
        return Err(ApiError::BadRequest("no updates provided".to_string()));
    }
    ensure_allowlisted(payload.keys(), TASK_UPDATE_FIELDS)?;
    ensure_no_nulls(&payload)?;

    let mut update: UpdateTaskRequest = serde_json::from_value(Value::Object(payload))
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if let Some(description) = &update.description {
        update.description = Some(description.trim().to_string());
    }
    update.validate().map_err(validation_error)?;

    let task = Task::update(
        &state.db,
        id,
        session.user.id,
        UpdateTask {
            description: update.description,
            status: update.status,
        },
    )
    .await?
    .ok_or(ApiError::NotFound)?;

    Ok(Json(task))
}

/// DELETE /tasks/:id
///
/// Deletes an owned task and returns it.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let task = Task::delete_by_id_and_owner(&state.db, id, session.user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::debug!(task_id = %task.id, "Task deleted");

    Ok(Json(task))
}

/// Malformed ids are a 400 ("invalid id"), distinct from a missing task's 404
fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId)
}

fn parse_status_param(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_sort_param(raw: &str) -> Option<SortOrder> {
    match raw {
        "createdAt:asc" => Some(SortOrder::Asc),
        "createdAt:desc" => Some(SortOrder::Desc),
        _ => None,
    }
}

fn parse_page_param(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|n| *n >= 0)
}
