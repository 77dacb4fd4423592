//! Repetition schedule lookup.
//!
//! Given the stage a task currently sits at (or none), find the stage that
//! follows it. The catalog is reached through an injected
//! [`ScheduleProvider`], so callers can hand in the database, a cached
//! [`Schedule`] snapshot, or a fixture.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::repetition::{
    NewRepetitionType, ORDER_BEFORE_FIRST, RepetitionType, RepetitionTypeId,
};
use crate::store::ScheduleProvider;

/// Find the stage after `current`.
///
/// `None` as input means the task has not entered any stage yet. `Ok(None)`
/// means there is no further stage, which is a normal terminal condition.
/// A `current` id that is absent from the catalog fails with `NotFound`.
pub async fn next_stage(
    provider: &dyn ScheduleProvider,
    current: Option<RepetitionTypeId>,
) -> Result<Option<RepetitionType>> {
    let order = match current {
        None => ORDER_BEFORE_FIRST,
        Some(id) => {
            provider
                .find_stage(id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("repetition type {id}")))?
                .order
        }
    };
    provider.find_next_stage(order).await
}

// ---------------------------------------------------------------------------
// Schedule snapshot
// ---------------------------------------------------------------------------

/// A validated in-memory copy of the catalog, sorted by order.
///
/// Every insertion enforces the catalog invariants, so lookups never have to
/// break ties between stages sharing an order.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    stages: Vec<RepetitionType>,
}

impl Schedule {
    pub fn new(stages: impl IntoIterator<Item = RepetitionType>) -> Result<Self> {
        let mut schedule = Self::default();
        for stage in stages {
            schedule.insert(stage)?;
        }
        Ok(schedule)
    }

    /// Build a schedule from stage definitions, assigning fresh ids.
    pub fn from_definitions(defs: impl IntoIterator<Item = NewRepetitionType>) -> Result<Self> {
        let mut schedule = Self::default();
        for def in defs {
            def.validate()?;
            schedule.insert(def.into_repetition_type(RepetitionTypeId::new()))?;
        }
        Ok(schedule)
    }

    pub fn insert(&mut self, stage: RepetitionType) -> Result<()> {
        NewRepetitionType::new(stage.name.clone(), stage.order, stage.day).validate()?;
        if self.stages.iter().any(|s| s.id == stage.id) {
            return Err(Error::Conflict(format!("duplicate repetition type id {}", stage.id)));
        }
        match self.stages.binary_search_by_key(&stage.order, |s| s.order) {
            Ok(_) => Err(Error::Conflict(format!(
                "repetition type order {} is already taken",
                stage.order
            ))),
            Err(pos) => {
                self.stages.insert(pos, stage);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: RepetitionTypeId) -> Option<&RepetitionType> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// First stage whose order is strictly greater than `order`.
    pub fn next_after(&self, order: i32) -> Option<&RepetitionType> {
        let pos = self.stages.partition_point(|s| s.order <= order);
        self.stages.get(pos)
    }

    pub fn stages(&self) -> &[RepetitionType] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[async_trait]
impl ScheduleProvider for Schedule {
    async fn find_stage(&self, id: RepetitionTypeId) -> Result<Option<RepetitionType>> {
        Ok(self.get(id).cloned())
    }

    async fn find_next_stage(&self, after_order: i32) -> Result<Option<RepetitionType>> {
        Ok(self.next_after(after_order).cloned())
    }

    async fn list_stages(&self) -> Result<Vec<RepetitionType>> {
        Ok(self.stages.clone())
    }
}

// ---------------------------------------------------------------------------
// Schedule files
// ---------------------------------------------------------------------------

/// A catalog definition on disk:
///
/// ```toml
/// [[stage]]
/// name = "first review"
/// order = 1
/// day = 1
/// ```
#[derive(Debug, Deserialize)]
pub struct ScheduleFile {
    #[serde(default, rename = "stage")]
    pub stages: Vec<NewRepetitionType>,
}

impl ScheduleFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read schedule file {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("bad schedule file {}: {e}", path.display())))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Validate the definitions as a whole and build a snapshot from them.
    pub fn into_schedule(self) -> Result<Schedule> {
        Schedule::from_definitions(self.stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Schedule {
        Schedule::from_definitions([
            NewRepetitionType::new("weekly", 2, 7),
            NewRepetitionType::new("monthly", 5, 30),
            NewRepetitionType::new("soon", 1, 3),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn walks_every_stage_once_in_ascending_order() {
        let schedule = catalog();
        let mut visited = Vec::new();
        let mut current = None;
        while let Some(stage) = next_stage(&schedule, current).await.unwrap() {
            visited.push(stage.order);
            current = Some(stage.id);
        }
        assert_eq!(visited, vec![1, 2, 5]);
    }

    #[tokio::test]
    async fn empty_catalog_has_no_first_stage() {
        let schedule = Schedule::default();
        assert!(next_stage(&schedule, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_stage_is_not_found() {
        let schedule = catalog();
        let err = next_stage(&schedule, Some(RepetitionTypeId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn next_after_skips_gaps_in_order() {
        let schedule = catalog();
        assert_eq!(schedule.next_after(2).map(|s| s.order), Some(5));
        assert_eq!(schedule.next_after(3).map(|s| s.order), Some(5));
        assert!(schedule.next_after(5).is_none());
    }

    #[test]
    fn duplicate_order_is_rejected_on_insert() {
        let err = Schedule::from_definitions([
            NewRepetitionType::new("a", 1, 1),
            NewRepetitionType::new("b", 1, 2),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)), "got {err:?}");
    }

    #[test]
    fn order_zero_is_reserved() {
        let err = Schedule::from_definitions([NewRepetitionType::new("a", 0, 1)]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    }

    #[test]
    fn parses_schedule_file() {
        let file = ScheduleFile::parse(
            r#"
            [[stage]]
            name = "tomorrow"
            order = 1
            day = 1

            [[stage]]
            name = "next week"
            order = 2
            day = 7
            "#,
        )
        .unwrap();
        let schedule = file.into_schedule().unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.stages()[1].name, "next week");
    }

    #[test]
    fn loads_schedule_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"[[stage]]\nname = \"tomorrow\"\norder = 1\nday = 1\n",
        )
        .unwrap();

        let schedule = ScheduleFile::load(file.path())
            .unwrap()
            .into_schedule()
            .unwrap();
        assert_eq!(schedule.stages()[0].day, 1);

        let err = ScheduleFile::load(Path::new("/nonexistent/schedule.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err:?}");
    }
}
