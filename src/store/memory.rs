//! In-memory backend.
//!
//! Implements every store contract behind a single mutex, so each call,
//! including the progress compare-and-swap, is atomic. Used by the test suite
//! and by `repetask serve --in-memory`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{NoteStore, ScheduleProvider, Store, TaskStore, UserStore};
use crate::engine::schedule::Schedule;
use crate::error::{Error, Result};
use crate::model::note::{NewNote, Note, NoteId};
use crate::model::repetition::{NewRepetitionType, RepetitionType, RepetitionTypeId};
use crate::model::task::{NewTask, Progress, Task, TaskId, TaskPatch};
use crate::model::user::{NewUser, User, UserId, normalize_email};

#[derive(Default)]
struct Inner {
    schedule: Schedule,
    users: HashMap<UserId, User>,
    // Vec keeps insertion order for listings.
    tasks: Vec<Task>,
    notes: Vec<Note>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(schedule: Schedule) -> Self {
        Self {
            inner: Mutex::new(Inner {
                schedule,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Other("memory store lock poisoned".to_string()))
    }

    /// Add a stage to the catalog. Duplicate orders are rejected.
    pub fn add_stage(&self, new: NewRepetitionType) -> Result<RepetitionType> {
        new.validate()?;
        let stage = new.into_repetition_type(RepetitionTypeId::new());
        self.lock()?.schedule.insert(stage.clone())?;
        Ok(stage)
    }

    /// Remove a stage from the catalog, leaving tasks that reference it dangling.
    pub fn remove_stage(&self, id: RepetitionTypeId) -> Result<()> {
        let mut inner = self.lock()?;
        let remaining = inner
            .schedule
            .stages()
            .iter()
            .filter(|s| s.id != id)
            .cloned()
            .collect::<Vec<_>>();
        if remaining.len() == inner.schedule.len() {
            return Err(Error::NotFound(format!("repetition type {id}")));
        }
        inner.schedule = Schedule::new(remaining)?;
        Ok(())
    }

    /// Notes whose task no longer exists.
    pub fn count_orphaned_notes(&self) -> Result<u64> {
        let inner = self.lock()?;
        let orphans = inner
            .notes
            .iter()
            .filter(|n| !inner.tasks.iter().any(|t| t.id == n.task))
            .count();
        Ok(orphans as u64)
    }
}

impl Inner {
    fn owned_task(&self, owner: UserId, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id && t.user == owner)
    }
}

fn task_not_found(id: TaskId) -> Error {
    Error::NotFound(format!("task {id}"))
}

#[async_trait]
impl ScheduleProvider for MemoryStore {
    async fn find_stage(&self, id: RepetitionTypeId) -> Result<Option<RepetitionType>> {
        Ok(self.lock()?.schedule.get(id).cloned())
    }

    async fn find_next_stage(&self, after_order: i32) -> Result<Option<RepetitionType>> {
        Ok(self.lock()?.schedule.next_after(after_order).cloned())
    }

    async fn list_stages(&self) -> Result<Vec<RepetitionType>> {
        Ok(self.lock()?.schedule.stages().to_vec())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, owner: UserId, new: NewTask) -> Result<Task> {
        let task = new.into_task(TaskId::new(), owner, Utc::now());
        self.lock()?.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(&self, owner: UserId) -> Result<Vec<Task>> {
        Ok(self
            .lock()?
            .tasks
            .iter()
            .filter(|t| t.user == owner)
            .cloned()
            .collect())
    }

    async fn find_task(&self, owner: UserId, id: TaskId) -> Result<Task> {
        let inner = self.lock()?;
        let idx = inner.owned_task(owner, id).ok_or_else(|| task_not_found(id))?;
        Ok(inner.tasks[idx].clone())
    }

    async fn update_task(&self, owner: UserId, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let mut inner = self.lock()?;
        let idx = inner.owned_task(owner, id).ok_or_else(|| task_not_found(id))?;
        let task = &mut inner.tasks[idx];
        task.apply_patch(patch);
        Ok(task.clone())
    }

    async fn delete_task(&self, owner: UserId, id: TaskId) -> Result<()> {
        let mut inner = self.lock()?;
        let idx = inner.owned_task(owner, id).ok_or_else(|| task_not_found(id))?;
        inner.tasks.remove(idx);
        Ok(())
    }

    async fn update_progress(
        &self,
        owner: UserId,
        id: TaskId,
        expected: &Progress,
        next: &Progress,
    ) -> Result<Task> {
        let mut inner = self.lock()?;
        let idx = inner.owned_task(owner, id).ok_or_else(|| task_not_found(id))?;
        let task = &mut inner.tasks[idx];
        if task.progress() != *expected {
            return Err(Error::Conflict(format!("task {id} was modified concurrently")));
        }
        task.apply_progress(next);
        Ok(task.clone())
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn insert_note(&self, owner: UserId, task: TaskId, new: NewNote) -> Result<Note> {
        let mut inner = self.lock()?;
        if inner.owned_task(owner, task).is_none() {
            return Err(task_not_found(task));
        }
        let note = new.into_note(NoteId::new(), owner, task, Utc::now());
        inner.notes.push(note.clone());
        Ok(note)
    }

    async fn list_notes(&self, owner: UserId, task: TaskId) -> Result<Vec<Note>> {
        let inner = self.lock()?;
        if inner.owned_task(owner, task).is_none() {
            return Err(task_not_found(task));
        }
        Ok(inner
            .notes
            .iter()
            .filter(|n| n.user == owner && n.task == task)
            .cloned()
            .collect())
    }

    async fn delete_note(&self, owner: UserId, id: NoteId) -> Result<()> {
        let mut inner = self.lock()?;
        let idx = inner
            .notes
            .iter()
            .position(|n| n.id == id && n.user == owner)
            .ok_or_else(|| Error::NotFound(format!("note {id}")))?;
        inner.notes.remove(idx);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> Result<User> {
        let mut inner = self.lock()?;
        let email = normalize_email(&new.email);
        if inner.users.values().any(|u| u.email == email) {
            return Err(Error::Conflict(format!("email {email} is already registered")));
        }
        let user = NewUser { email, ..new }.into_user(UserId::new(), Utc::now());
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<()> {
        self.lock().map(|_| ())
    }
}
