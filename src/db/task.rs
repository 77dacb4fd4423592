//! Task queries. Every statement filters by `user_id`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::repetition::RepetitionTypeId;
use crate::model::task::{NewTask, Progress, Task, TaskId, TaskPatch};
use crate::model::user::UserId;
use crate::store::TaskStore;

const COLUMNS: &str = "id, user_id, title, link, summary, tags, repetition_type, repetition_begin, completed_at, created_at";

fn not_found(id: TaskId) -> Error {
    Error::NotFound(format!("task {id}"))
}

#[async_trait]
impl TaskStore for super::Db {
    async fn insert_task(&self, owner: UserId, new: NewTask) -> Result<Task> {
        let row: TaskRow = sqlx::query_as(&format!(
            "INSERT INTO tasks (id, user_id, title, link, summary, tags, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(owner.0)
        .bind(&new.title)
        .bind(&new.link)
        .bind(&new.summary)
        .bind(&new.tags)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;
        Ok(row.into())
    }

    async fn list_tasks(&self, owner: UserId) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(owner.0)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn find_task(&self, owner: UserId, id: TaskId) -> Result<Task> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.0)
        .bind(owner.0)
        .fetch_optional(self.pool())
        .await?;
        row.map(Task::from).ok_or_else(|| not_found(id))
    }

    async fn update_task(&self, owner: UserId, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "UPDATE tasks SET title = $1, link = $2, summary = $3, tags = $4
             WHERE id = $5 AND user_id = $6
             RETURNING {COLUMNS}"
        ))
        .bind(&patch.title)
        .bind(&patch.link)
        .bind(&patch.summary)
        .bind(&patch.tags)
        .bind(id.0)
        .bind(owner.0)
        .fetch_optional(self.pool())
        .await?;
        row.map(Task::from).ok_or_else(|| not_found(id))
    }

    async fn delete_task(&self, owner: UserId, id: TaskId) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id.0)
            .bind(owner.0)
            .execute(self.pool())
            .await?
            .rows_affected();
        if rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Optimistic concurrency: the WHERE clause pins the progress read by the
    /// caller, so a concurrent completion makes this update match zero rows.
    async fn update_progress(
        &self,
        owner: UserId,
        id: TaskId,
        expected: &Progress,
        next: &Progress,
    ) -> Result<Task> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "UPDATE tasks SET repetition_type = $1, repetition_begin = $2, completed_at = $3
             WHERE id = $4 AND user_id = $5
             AND repetition_type IS NOT DISTINCT FROM $6::uuid
             AND repetition_begin IS NOT DISTINCT FROM $7::timestamptz
             AND completed_at IS NOT DISTINCT FROM $8::timestamptz
             RETURNING {COLUMNS}"
        ))
        .bind(next.repetition_type.map(|r| r.0))
        .bind(next.repetition_begin)
        .bind(next.completed_at)
        .bind(id.0)
        .bind(owner.0)
        .bind(expected.repetition_type.map(|r| r.0))
        .bind(expected.repetition_begin)
        .bind(expected.completed_at)
        .fetch_optional(self.pool())
        .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // Zero rows: either the task is gone or its progress moved on.
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM tasks WHERE id = $1 AND user_id = $2")
                .bind(id.0)
                .bind(owner.0)
                .fetch_optional(self.pool())
                .await?;
        match exists {
            Some(_) => Err(Error::Conflict(format!("task {id} was modified concurrently"))),
            None => Err(not_found(id)),
        }
    }
}

/// Internal row type for sqlx::FromRow.
#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    link: Option<String>,
    summary: Option<String>,
    tags: Vec<String>,
    repetition_type: Option<Uuid>,
    repetition_begin: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: TaskId(row.id),
            title: row.title,
            link: row.link,
            summary: row.summary,
            tags: row.tags,
            user: UserId(row.user_id),
            repetition_type: row.repetition_type.map(RepetitionTypeId),
            repetition_begin: row.repetition_begin,
            completed_at: row.completed_at,
            created_at: row.created_at,
        }
    }
}
