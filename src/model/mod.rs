//! Core data model.
//!
//! Users own tasks; tasks own notes; tasks walk through an externally
//! administered catalog of repetition types until they are completed.

/// Declares a UUID-backed identifier newtype.
macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Parse an identifier from user input (path segments, CLI args).
            pub fn parse(s: &str) -> crate::error::Result<Self> {
                uuid::Uuid::parse_str(s.trim()).map(Self).map_err(|_| {
                    crate::error::Error::Validation(format!("incorrect {} id: {s}", $label))
                })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub mod note;
pub mod repetition;
pub mod task;
pub mod user;

/// Trim a user-supplied string, returning `None` when nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
