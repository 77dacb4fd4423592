//! Persistence collaborator contracts.
//!
//! The stores hold no ownership logic of their own beyond honoring the
//! `owner` argument: every task and note operation takes the authenticated
//! [`UserId`] and must filter by it. A record owned by someone else is
//! reported exactly like a missing one.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::note::{NewNote, Note, NoteId};
use crate::model::repetition::{RepetitionType, RepetitionTypeId};
use crate::model::task::{NewTask, Progress, Task, TaskId, TaskPatch};
use crate::model::user::{NewUser, User, UserId};

pub use memory::MemoryStore;

/// Read-only access to the repetition type catalog.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    /// Look up a stage by identity.
    async fn find_stage(&self, id: RepetitionTypeId) -> Result<Option<RepetitionType>>;

    /// The stage with the smallest `order` strictly greater than `after_order`.
    async fn find_next_stage(&self, after_order: i32) -> Result<Option<RepetitionType>>;

    /// The whole catalog, ascending by `order`.
    async fn list_stages(&self) -> Result<Vec<RepetitionType>>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, owner: UserId, new: NewTask) -> Result<Task>;

    async fn list_tasks(&self, owner: UserId) -> Result<Vec<Task>>;

    /// Fails with `NotFound` when the task is absent or owned by someone else.
    async fn find_task(&self, owner: UserId, id: TaskId) -> Result<Task>;

    /// Replace the editable fields. Progress is left untouched.
    async fn update_task(&self, owner: UserId, id: TaskId, patch: TaskPatch) -> Result<Task>;

    /// Delete the task. Its notes are left in place.
    async fn delete_task(&self, owner: UserId, id: TaskId) -> Result<()>;

    /// Compare-and-swap the progress fields.
    ///
    /// Writes `next` only if the stored progress still equals `expected`.
    /// Returns `Conflict` if the task exists but changed underneath the
    /// caller, `NotFound` if no such owned task exists.
    async fn update_progress(
        &self,
        owner: UserId,
        id: TaskId,
        expected: &Progress,
        next: &Progress,
    ) -> Result<Task>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Fails with `NotFound` unless `task` exists and is owned by `owner`.
    async fn insert_note(&self, owner: UserId, task: TaskId, new: NewNote) -> Result<Note>;

    /// Fails with `NotFound` unless `task` exists and is owned by `owner`.
    async fn list_notes(&self, owner: UserId, task: TaskId) -> Result<Vec<Note>>;

    async fn delete_note(&self, owner: UserId, id: NoteId) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` if the email is already registered.
    async fn insert_user(&self, new: NewUser) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Everything the HTTP layer needs from a backend.
#[async_trait]
pub trait Store: ScheduleProvider + TaskStore + NoteStore + UserStore {
    /// Cheap liveness probe of the backing storage.
    async fn health_check(&self) -> Result<()>;
}
