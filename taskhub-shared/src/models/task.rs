/// Task model and database operations
///
/// Every task belongs to exactly one user, fixed at creation; all reads and
/// writes are scoped to that owner so a task is indistinguishable from a
/// non-existent one for anybody else.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     description TEXT NOT NULL,
///     status BOOLEAN NOT NULL DEFAULT FALSE,
///     owner_id UUID NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `owner_id` carries no foreign key: account deletion removes the user row
/// first and sweeps owned tasks afterwards (see [`Task::delete_by_owner`]).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, description, status, owner_id, created_at, updated_at";

/// Task model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// What needs doing (trimmed, non-empty)
    pub description: String,

    /// Completion flag (false = incomplete)
    pub status: bool,

    /// Owning user, fixed at creation
    pub owner_id: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Description (trimmed, non-empty)
    pub description: String,

    /// Completion flag (defaults to false)
    pub status: bool,

    /// Owning user id — always the authenticated requester
    pub owner_id: Uuid,
}

/// Input for updating a task
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New description
    pub description: Option<String>,

    /// New completion flag
    pub status: Option<bool>,
}

impl UpdateTask {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.status.is_none()
    }
}

/// Sort direction for creation-time ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first
    Asc,

    /// Newest first
    Desc,
}

/// Filtering, sorting, and pagination options for listing tasks
///
/// Every field is optional; `None` means "store default" (no filter, no
/// explicit order, no page bounds).
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    /// Keep only tasks with exactly this status
    pub status: Option<bool>,

    /// Order by creation time
    pub sort_by_created: Option<SortOrder>,

    /// Maximum rows returned
    pub limit: Option<i64>,

    /// Rows skipped before the first returned
    pub skip: Option<i64>,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (description, status, owner_id)
             VALUES ($1, $2, $3)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(data.description)
        .bind(data.status)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by id, scoped to its owner
    ///
    /// Returns `None` both when no such task exists and when it exists but
    /// belongs to somebody else.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists an owner's tasks with optional filter/sort/pagination
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
        filter: TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        // Build the statement from whichever options are present
        let mut query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1");
        let mut bind_count = 1;

        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }

        match filter.sort_by_created {
            Some(SortOrder::Asc) => query.push_str(" ORDER BY created_at ASC"),
            Some(SortOrder::Desc) => query.push_str(" ORDER BY created_at DESC"),
            None => {}
        }

        if filter.limit.is_some() {
            bind_count += 1;
            query.push_str(&format!(" LIMIT ${}", bind_count));
        }
        if filter.skip.is_some() {
            bind_count += 1;
            query.push_str(&format!(" OFFSET ${}", bind_count));
        }

        let mut q = sqlx::query_as::<_, Task>(&query).bind(owner_id);

        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(limit) = filter.limit {
            q = q.bind(limit);
        }
        if let Some(skip) = filter.skip {
            q = q.bind(skip);
        }

        q.fetch_all(pool).await
    }

    /// Updates a task, scoped to its owner
    ///
    /// Only `Some` fields in `data` are written; `updated_at` is always
    /// refreshed. Returns `None` when no owned task matches.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id_and_owner(pool, id, owner_id).await;
        }

        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(owner_id);

        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        q.fetch_optional(pool).await
    }

    /// Finds and deletes a task in one statement, scoped to its owner
    ///
    /// Returns the deleted task, or `None` when no owned task matched.
    pub async fn delete_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes every task owned by a user (account-deletion sweep)
    ///
    /// Returns the number of tasks removed.
    pub async fn delete_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner_id = $1")
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts tasks owned by a user
    pub async fn count_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_task_default_is_empty() {
        assert!(UpdateTask::default().is_empty());
        assert!(!UpdateTask {
            status: Some(true),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_task_filter_default() {
        let filter = TaskFilter::default();
        assert!(filter.status.is_none());
        assert!(filter.sort_by_created.is_none());
        assert!(filter.limit.is_none());
        assert!(filter.skip.is_none());
    }

    #[test]
    fn test_task_serialization_shape() {
        let task = Task {
            id: Uuid::new_v4(),
            description: "go shopping".to_string(),
            status: false,
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["description"], "go shopping");
        assert_eq!(obj["status"], false);
        assert!(obj.contains_key("owner_id"));
        assert!(obj.contains_key("created_at"));
    }
}
