//! Secret handling utilities.
//!
//! Re-exports secrecy types so binaries and tests can expose the database
//! URL without a direct secrecy dependency.

pub use secrecy::{ExposeSecret, SecretString};
