//! Note queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::note::{NewNote, Note, NoteId};
use crate::model::task::TaskId;
use crate::model::user::UserId;
use crate::store::NoteStore;

const COLUMNS: &str = "id, user_id, task_id, text, important, created_at";

impl super::Db {
    /// Notes whose task has been deleted. Task deletion does not cascade, so
    /// these accumulate over time.
    pub async fn count_orphaned_notes(&self) -> Result<u64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT count(*) FROM notes n
             WHERE NOT EXISTS (SELECT 1 FROM tasks t WHERE t.id = n.task_id)",
        )
        .fetch_one(self.pool())
        .await?;
        Ok(row.0 as u64)
    }
}

#[async_trait]
impl NoteStore for super::Db {
    async fn insert_note(&self, owner: UserId, task: TaskId, new: NewNote) -> Result<Note> {
        // Ownership check and insert in one statement: the SELECT yields no
        // row unless the task belongs to `owner`.
        let row: Option<NoteRow> = sqlx::query_as(&format!(
            "INSERT INTO notes (id, user_id, task_id, text, important, created_at)
             SELECT $1, $2, t.id, $4, $5, $6 FROM tasks t WHERE t.id = $3 AND t.user_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(owner.0)
        .bind(task.0)
        .bind(&new.text)
        .bind(new.important)
        .bind(Utc::now())
        .fetch_optional(self.pool())
        .await?;
        row.map(Note::from)
            .ok_or_else(|| Error::NotFound(format!("task {task}")))
    }

    async fn list_notes(&self, owner: UserId, task: TaskId) -> Result<Vec<Note>> {
        let (owned,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM tasks WHERE id = $2 AND user_id = $1)",
        )
        .bind(owner.0)
        .bind(task.0)
        .fetch_one(self.pool())
        .await?;
        if !owned {
            return Err(Error::NotFound(format!("task {task}")));
        }

        let rows: Vec<NoteRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM notes WHERE user_id = $1 AND task_id = $2 ORDER BY created_at ASC"
        ))
        .bind(owner.0)
        .bind(task.0)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn delete_note(&self, owner: UserId, id: NoteId) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id.0)
            .bind(owner.0)
            .execute(self.pool())
            .await?
            .rows_affected();
        if rows_affected == 0 {
            return Err(Error::NotFound(format!("note {id}")));
        }
        Ok(())
    }
}

/// Internal row type for sqlx::FromRow.
#[derive(sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    user_id: Uuid,
    task_id: Uuid,
    text: String,
    important: bool,
    created_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: NoteId(row.id),
            text: row.text,
            important: row.important,
            user: UserId(row.user_id),
            task: TaskId(row.task_id),
            created_at: row.created_at,
        }
    }
}
