//! Repetition type catalog queries.

use async_trait::async_trait;
use uuid::Uuid;

use super::unique_violation;
use crate::error::{Error, Result};
use crate::model::repetition::{NewRepetitionType, RepetitionType, RepetitionTypeId};
use crate::store::ScheduleProvider;

const COLUMNS: &str = "id, name, sort_order, day";

impl super::Db {
    /// Add a stage to the catalog. A taken order is reported as `Conflict`.
    pub async fn insert_repetition_type(&self, new: NewRepetitionType) -> Result<RepetitionType> {
        self.seed_repetition_types(vec![new])
            .await?
            .pop()
            .ok_or_else(|| Error::Other("repetition type insert returned nothing".to_string()))
    }

    /// Insert a whole set of stages in one transaction. Either every stage
    /// lands or none does.
    pub async fn seed_repetition_types(
        &self,
        defs: Vec<NewRepetitionType>,
    ) -> Result<Vec<RepetitionType>> {
        let mut tx = self.pool().begin().await?;
        let mut inserted = Vec::with_capacity(defs.len());
        for def in defs {
            def.validate()?;
            let stage = def.into_repetition_type(RepetitionTypeId::new());
            sqlx::query(
                "INSERT INTO repetition_types (id, name, sort_order, day) VALUES ($1, $2, $3, $4)",
            )
            .bind(stage.id.0)
            .bind(&stage.name)
            .bind(stage.order)
            .bind(stage.day)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                unique_violation(e, || format!("repetition type order {} is already taken", stage.order))
            })?;
            inserted.push(stage);
        }
        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn delete_repetition_type(&self, id: RepetitionTypeId) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM repetition_types WHERE id = $1")
            .bind(id.0)
            .execute(self.pool())
            .await?
            .rows_affected();
        if rows_affected == 0 {
            return Err(Error::NotFound(format!("repetition type {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleProvider for super::Db {
    async fn find_stage(&self, id: RepetitionTypeId) -> Result<Option<RepetitionType>> {
        let row: Option<RepetitionTypeRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM repetition_types WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(RepetitionType::from))
    }

    async fn find_next_stage(&self, after_order: i32) -> Result<Option<RepetitionType>> {
        let row: Option<RepetitionTypeRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM repetition_types WHERE sort_order > $1 ORDER BY sort_order ASC LIMIT 1"
        ))
        .bind(after_order)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(RepetitionType::from))
    }

    async fn list_stages(&self) -> Result<Vec<RepetitionType>> {
        let rows: Vec<RepetitionTypeRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM repetition_types ORDER BY sort_order ASC"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(RepetitionType::from).collect())
    }
}

/// Internal row type for sqlx::FromRow.
#[derive(sqlx::FromRow)]
struct RepetitionTypeRow {
    id: Uuid,
    name: String,
    sort_order: i32,
    day: i32,
}

impl From<RepetitionTypeRow> for RepetitionType {
    fn from(row: RepetitionTypeRow) -> Self {
        Self {
            id: RepetitionTypeId(row.id),
            name: row.name,
            order: row.sort_order,
            day: row.day,
        }
    }
}
