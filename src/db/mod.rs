//! Postgres backend.
//!
//! [`Db`] implements every store contract against Postgres. Each submodule
//! owns the queries for one table.

pub mod note;
pub mod repetition;
pub mod task;
pub mod user;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::{Error, Result};
use crate::store::Store;

/// Postgres-backed store. Cloning shares the pool.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Apply `migrations/` up to the latest version.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Round-trip a `SELECT 1`.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for Db {
    async fn health_check(&self) -> Result<()> {
        Db::health_check(self).await
    }
}

/// Map a unique-index violation to `Conflict`, everything else to `Database`.
pub(crate) fn unique_violation(err: sqlx::Error, what: impl FnOnce() -> String) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::Conflict(what()),
        _ => Error::Database(err),
    }
}
