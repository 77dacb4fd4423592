//! Error types for repetask.

use thiserror::Error;

use crate::model::task::TaskId;

#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The record does not exist, or is not owned by the caller.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("task {0} is already completed")]
    AlreadyCompleted(TaskId),

    /// Stored data violates an invariant (e.g. a task points at a deleted
    /// repetition type). Fatal, never retried.
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),

    /// Concurrent modification or uniqueness clash detected by the store.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Errors the caller caused, as opposed to infrastructure failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::NotFound(_)
                | Error::AlreadyCompleted(_)
                | Error::Conflict(_)
                | Error::Unauthorized
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
