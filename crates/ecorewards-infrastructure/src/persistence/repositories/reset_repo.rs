use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::SqliteRepositoryBase;
use ecorewards_domain::reset::{MonthlyResetRecord, ResetRepository};
use ecorewards_domain::shared::{DomainError, ResetRecordId, UserId};

#[derive(FromRow)]
struct ResetRow {
    id: String,
    user_id: String,
    reset_date: DateTime<Utc>,
    points_before_reset: i64,
    activities_count: i64,
    sharing_count: i64,
    created_at: DateTime<Utc>,
}

impl ResetRow {
    fn into_record(self) -> MonthlyResetRecord {
        MonthlyResetRecord::restore(
            ResetRecordId::from_string(&self.id),
            UserId::from_string(&self.user_id),
            self.reset_date,
            self.points_before_reset,
            self.activities_count,
            self.sharing_count,
            self.created_at,
        )
    }
}

pub struct SqliteResetRepository {
    base: SqliteRepositoryBase,
}

impl SqliteResetRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl ResetRepository for SqliteResetRepository {
    async fn record_reset(&self, record: &MonthlyResetRecord) -> Result<(), DomainError> {
        // OR IGNORE: the (user, reset_date) uniqueness backstops the claim,
        // so replaying a period is a no-op instead of a duplicate row.
        let query = r#"
            INSERT OR IGNORE INTO monthly_resets (
                id,
                user_id,
                reset_date,
                points_before_reset,
                activities_count,
                sharing_count,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(record.id().as_str())
                    .bind(record.user_id().as_str())
                    .bind(record.reset_date())
                    .bind(record.points_before_reset())
                    .bind(record.activities_count())
                    .bind(record.sharing_count())
                    .bind(record.created_at()),
                "Record monthly reset",
            )
            .await?;

        Ok(())
    }

    async fn latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<MonthlyResetRecord>, DomainError> {
        let query = r#"
            SELECT
                id,
                user_id,
                reset_date,
                points_before_reset,
                activities_count,
                sharing_count,
                created_at
            FROM monthly_resets
            WHERE user_id = ?1
            ORDER BY reset_date DESC
            LIMIT 1
        "#;

        let row: Option<ResetRow> = self
            .base
            .fetch_optional(
                sqlx::query_as(query).bind(user_id.as_str()),
                "Find latest reset for user",
            )
            .await?;

        Ok(row.map(|r| r.into_record()))
    }

    async fn history_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<MonthlyResetRecord>, DomainError> {
        let query = r#"
            SELECT
                id,
                user_id,
                reset_date,
                points_before_reset,
                activities_count,
                sharing_count,
                created_at
            FROM monthly_resets
            WHERE user_id = ?1
            ORDER BY reset_date DESC
        "#;

        let rows: Vec<ResetRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query).bind(user_id.as_str()),
                "List reset history for user",
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.into_record()).collect())
    }
}
