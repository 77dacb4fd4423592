//! Notes attached to tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::TaskId;
use super::user::UserId;
use crate::error::{Error, Result};

id_newtype!(
    /// Identifier of a note.
    NoteId,
    "note"
);

/// Free text attached to a task. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    #[serde(default)]
    pub important: bool,
    pub user: UserId,
    pub task: TaskId,
    pub created_at: DateTime<Utc>,
}

/// Note fields as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub text: String,
    pub important: bool,
}

impl NoteInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            important: false,
        }
    }

    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }

    pub fn validate(self) -> Result<NewNote> {
        let text = super::non_blank(self.text)
            .ok_or_else(|| Error::Validation("missing field: text".into()))?;
        Ok(NewNote {
            text,
            important: self.important,
        })
    }
}

impl NewNote {
    pub fn into_note(
        self,
        id: NoteId,
        user: UserId,
        task: TaskId,
        created_at: DateTime<Utc>,
    ) -> Note {
        Note {
            id,
            text: self.text,
            important: self.important,
            user,
            task,
            created_at,
        }
    }
}
