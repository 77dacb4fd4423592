//! Server settings read from the process environment.
//!
//! Read once at startup. A missing `DATABASE_URL` or an unparsable number is
//! a startup error. The database URL carries credentials and is held as a
//! [`SecretString`], so `Debug` output redacts it.

pub mod secrets;

use std::time::Duration;

use crate::error::{Error, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Config {
    /// `None` only when running against the in-memory store.
    pub database_url: Option<SecretString>,
    pub host: String,
    pub port: u16,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Settings for the Postgres-backed server. `DATABASE_URL` is required.
    ///
    /// The binary loads a `.env` file first, if one exists.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: Some(SecretString::from(required_var("DATABASE_URL")?)),
            ..Self::from_env_without_database()?
        })
    }

    /// Like [`Config::from_env`], but `DATABASE_URL` is not required.
    pub fn from_env_without_database() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok().map(SecretString::from),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed_var("PORT", 8080)?,
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            request_timeout: Duration::from_secs(parsed_var("REQUEST_TIMEOUT_SECS", 15)?),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid {name} value {raw:?}: {e}"))),
        Err(_) => Ok(default),
    }
}
