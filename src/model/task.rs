//! Tasks and their repetition progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::repetition::RepetitionTypeId;
use super::user::UserId;
use crate::error::{Error, Result};

id_newtype!(
    /// Identifier of a task.
    TaskId,
    "task"
);

/// A reviewable item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub user: UserId,

    /// Current stage. `None` means the task has not entered any stage yet.
    #[serde(default)]
    pub repetition_type: Option<RepetitionTypeId>,

    /// When the current stage is due to begin.
    #[serde(default)]
    pub repetition_begin: Option<DateTime<Utc>>,

    /// Set once the task has run out of stages. Terminal.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn progress(&self) -> Progress {
        Progress {
            repetition_type: self.repetition_type,
            repetition_begin: self.repetition_begin,
            completed_at: self.completed_at,
        }
    }

    pub fn state(&self) -> TaskState {
        self.progress().state()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub(crate) fn apply_progress(&mut self, progress: &Progress) {
        self.repetition_type = progress.repetition_type;
        self.repetition_begin = progress.repetition_begin;
        self.completed_at = progress.completed_at;
    }

    pub(crate) fn apply_patch(&mut self, patch: TaskPatch) {
        self.title = patch.title;
        self.link = patch.link;
        self.summary = patch.summary;
        self.tags = patch.tags;
    }
}

/// The fields the completion state machine reads and writes. Stores compare
/// the previously observed value on write to detect concurrent completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub repetition_type: Option<RepetitionTypeId>,
    pub repetition_begin: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Progress {
    pub fn state(&self) -> TaskState {
        match (self.completed_at, self.repetition_type) {
            (Some(at), _) => TaskState::Completed(at),
            (None, Some(stage)) => TaskState::InProgress(stage),
            (None, None) => TaskState::NotStarted,
        }
    }
}

/// Lifecycle position of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum TaskState {
    NotStarted,
    InProgress(RepetitionTypeId),
    /// Terminal.
    Completed(DateTime<Utc>),
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed(_))
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::NotStarted => write!(f, "not_started"),
            TaskState::InProgress(stage) => write!(f, "in_progress({stage})"),
            TaskState::Completed(_) => write!(f, "completed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// User-editable task fields, as submitted on create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validated editable fields. Progress fields are never part of a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: String,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
}

/// A validated task ready for insertion.
pub type NewTask = TaskPatch;

impl TaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn validate(self) -> Result<TaskPatch> {
        let title = super::non_blank(self.title)
            .ok_or_else(|| Error::Validation("missing field: title".into()))?;
        let tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Ok(TaskPatch {
            title,
            link: super::non_blank(self.link),
            summary: super::non_blank(self.summary),
            tags,
        })
    }
}

impl TaskPatch {
    pub fn into_task(self, id: TaskId, user: UserId, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title,
            link: self.link,
            summary: self.summary,
            tags: self.tags,
            user,
            repetition_type: None,
            repetition_begin: None,
            completed_at: None,
            created_at,
        }
    }
}
