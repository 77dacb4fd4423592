//! Registered users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

id_newtype!(
    /// Identifier of a user. Every task and note access is scoped by it.
    UserId,
    "user"
);

/// A stored user account. The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub surname: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Validated registration with the plaintext password still attached.
/// Hash it with [`crate::auth::hash_password`] before building a [`NewUser`].
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub email: String,
    pub name: String,
    pub surname: String,
    pub password: String,
}

/// A user ready for insertion.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub surname: String,
    pub password_hash: String,
}

impl Registration {
    pub fn validate(self) -> Result<ValidRegistration> {
        let missing = |field: &str| Error::Validation(format!("missing field: {field}"));
        let email = super::non_blank(self.email)
            .map(|e| normalize_email(&e))
            .ok_or_else(|| missing("email"))?;
        let name = super::non_blank(self.name).ok_or_else(|| missing("name"))?;
        let surname = super::non_blank(self.surname).ok_or_else(|| missing("surname"))?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| missing("password"))?;
        Ok(ValidRegistration {
            email,
            name,
            surname,
            password,
        })
    }
}

impl NewUser {
    pub fn into_user(self, id: UserId, created_at: DateTime<Utc>) -> User {
        User {
            id,
            email: self.email,
            name: self.name,
            surname: self.surname,
            password_hash: self.password_hash,
            created_at,
        }
    }
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
