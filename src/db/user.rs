//! User account queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::unique_violation;
use crate::error::Result;
use crate::model::user::{NewUser, User, UserId, normalize_email};
use crate::store::UserStore;

const COLUMNS: &str = "id, email, name, surname, password_hash, created_at";

#[async_trait]
impl UserStore for super::Db {
    async fn insert_user(&self, new: NewUser) -> Result<User> {
        let email = normalize_email(&new.email);
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (id, email, name, surname, password_hash, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&email)
        .bind(&new.name)
        .bind(&new.surname)
        .bind(&new.password_hash)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await
        .map_err(|e| unique_violation(e, || format!("email {email} is already registered")))?;
        Ok(row.into())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM users WHERE lower(email) = $1"
        ))
        .bind(normalize_email(email))
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(User::from))
    }
}

/// Internal row type for sqlx::FromRow.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    surname: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            email: row.email,
            name: row.name,
            surname: row.surname,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}
