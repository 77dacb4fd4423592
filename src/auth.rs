//! Credential hashing and verification.
//!
//! Passwords are stored as argon2id PHC strings. Requests authenticate with
//! HTTP Basic credentials (email + password); a successful check yields the
//! caller's [`UserId`], which is then passed explicitly to every operation.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};
use crate::model::user::{NewUser, User, UserId, ValidRegistration};
use crate::store::UserStore;

/// Hash a plaintext password. Runs on the blocking pool.
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::Hash(e.to_string()))
    })
    .await
    .map_err(|e| Error::Other(format!("hashing task failed: {e}")))?
}

/// Check a plaintext password against a stored PHC string.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash).map_err(|e| Error::Hash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| Error::Other(format!("verification task failed: {e}")))?
}

/// Register a new account.
pub async fn register(users: &dyn UserStore, registration: ValidRegistration) -> Result<User> {
    let password_hash = hash_password(registration.password).await?;
    users
        .insert_user(NewUser {
            email: registration.email,
            name: registration.name,
            surname: registration.surname,
            password_hash,
        })
        .await
}

/// Resolve credentials to a user. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn authenticate(users: &dyn UserStore, email: &str, password: &str) -> Result<UserId> {
    let user = users
        .find_user_by_email(email)
        .await?
        .ok_or(Error::Unauthorized)?;
    if verify_password(password.to_string(), user.password_hash).await? {
        Ok(user.id)
    } else {
        Err(Error::Unauthorized)
    }
}

/// Decoded HTTP Basic credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parse an `Authorization` header value of the form `Basic <base64>`.
    pub fn parse(header: &str) -> Option<Self> {
        let (scheme, encoded) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn encode(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}
