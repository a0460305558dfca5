use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::SqliteRepositoryBase;
use ecorewards_domain::ledger::{ActivityType, ActivityTypeRepository};
use ecorewards_domain::shared::{ActivityTypeId, DomainError};

#[derive(FromRow)]
struct ActivityTypeRow {
    id: String,
    name: String,
    unit: String,
    points_per_unit: f64,
    co2_per_unit: f64,
}

impl ActivityTypeRow {
    fn into_activity_type(self) -> ActivityType {
        ActivityType::restore(
            ActivityTypeId::from_string(&self.id),
            self.name,
            self.unit,
            self.points_per_unit,
            self.co2_per_unit,
        )
    }
}

pub struct SqliteActivityTypeRepository {
    base: SqliteRepositoryBase,
}

impl SqliteActivityTypeRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl ActivityTypeRepository for SqliteActivityTypeRepository {
    async fn find_by_id(
        &self,
        id: &ActivityTypeId,
    ) -> Result<Option<ActivityType>, DomainError> {
        let query = r#"
            SELECT id, name, unit, points_per_unit, co2_per_unit
            FROM activity_types
            WHERE id = ?1
        "#;

        let row: Option<ActivityTypeRow> = self
            .base
            .fetch_optional(
                sqlx::query_as(query).bind(id.as_str()),
                "Find activity type by ID",
            )
            .await?;

        Ok(row.map(|r| r.into_activity_type()))
    }

    async fn find_all(&self) -> Result<Vec<ActivityType>, DomainError> {
        let query = r#"
            SELECT id, name, unit, points_per_unit, co2_per_unit
            FROM activity_types
            ORDER BY name ASC
        "#;

        let rows: Vec<ActivityTypeRow> = self
            .base
            .fetch_all(sqlx::query_as(query), "List activity types")
            .await?;

        Ok(rows.into_iter().map(|r| r.into_activity_type()).collect())
    }
}
