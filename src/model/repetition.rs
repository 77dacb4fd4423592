//! Repetition types: the stages a task walks through.
//!
//! Stages form a strict total order by `order`. Entering a stage schedules the
//! task `day` calendar days after the moment it was completed.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

id_newtype!(
    /// Identifier of a repetition type.
    RepetitionTypeId,
    "repetition type"
);

/// The order value that sits before every valid stage. A task without a
/// stage is treated as being at this position.
pub const ORDER_BEFORE_FIRST: i32 = 0;

/// A named interval in the repetition sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionType {
    pub id: RepetitionTypeId,
    pub name: String,
    /// Rank in the sequence. Unique across the catalog, ascending.
    pub order: i32,
    /// Days to add to "now" when a task enters this stage.
    pub day: i32,
}

/// Parameters for adding a stage to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRepetitionType {
    pub name: String,
    pub order: i32,
    pub day: i32,
}

impl NewRepetitionType {
    pub fn new(name: impl Into<String>, order: i32, day: i32) -> Self {
        Self {
            name: name.into(),
            order,
            day,
        }
    }

    /// Check the per-stage invariants. Uniqueness of `order` is a catalog-wide
    /// property and is checked by whoever writes the catalog.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("repetition type name is required".into()));
        }
        if self.order <= ORDER_BEFORE_FIRST {
            return Err(Error::Validation(format!(
                "repetition type order must be greater than {ORDER_BEFORE_FIRST}, got {}",
                self.order
            )));
        }
        if self.day < 0 {
            return Err(Error::Validation(format!(
                "repetition type day must not be negative, got {}",
                self.day
            )));
        }
        Ok(())
    }

    pub fn into_repetition_type(self, id: RepetitionTypeId) -> RepetitionType {
        RepetitionType {
            id,
            name: self.name.trim().to_string(),
            order: self.order,
            day: self.day,
        }
    }
}
