use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::SqliteRepositoryBase;
use ecorewards_domain::draw::{DrawEntryAllocation, DrawEntryRepository};
use ecorewards_domain::shared::{DomainError, DrawId, TierId, UserId};

#[derive(FromRow)]
struct AllocationRow {
    draw_id: String,
    user_id: String,
    entry_count: i64,
    acked_entries: i64,
    submitted_points: i64,
    tier_at_submission: String,
    updated_at: DateTime<Utc>,
}

impl AllocationRow {
    fn into_allocation(self) -> DrawEntryAllocation {
        DrawEntryAllocation::restore(
            DrawId::from_string(&self.draw_id),
            UserId::from_string(&self.user_id),
            self.entry_count,
            self.acked_entries,
            self.submitted_points,
            TierId::from_string(&self.tier_at_submission),
            self.updated_at,
        )
    }
}

pub struct SqliteDrawEntryRepository {
    base: SqliteRepositoryBase,
}

impl SqliteDrawEntryRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl DrawEntryRepository for SqliteDrawEntryRepository {
    async fn add_entries(
        &self,
        draw_id: &DrawId,
        user_id: &UserId,
        entries: i64,
        points: i64,
        tier_id: &TierId,
    ) -> Result<(), DomainError> {
        // Upsert-increment keeps one row per (draw, user); the increment
        // happens inside the statement, not via read-modify-write.
        let query = r#"
            INSERT INTO draw_entries (
                draw_id,
                user_id,
                entry_count,
                acked_entries,
                submitted_points,
                tier_at_submission,
                updated_at
            ) VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6)
            ON CONFLICT (draw_id, user_id) DO UPDATE SET
                entry_count = entry_count + excluded.entry_count,
                submitted_points = submitted_points + excluded.submitted_points,
                tier_at_submission = excluded.tier_at_submission,
                updated_at = excluded.updated_at
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(draw_id.as_str())
                    .bind(user_id.as_str())
                    .bind(entries)
                    .bind(points)
                    .bind(tier_id.as_str())
                    .bind(Utc::now()),
                "Add draw entries",
            )
            .await?;

        Ok(())
    }

    async fn mark_acked(&self, draw_id: &DrawId, user_id: &UserId) -> Result<(), DomainError> {
        let query = r#"
            UPDATE draw_entries
            SET acked_entries = entry_count
            WHERE draw_id = ?1 AND user_id = ?2
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(draw_id.as_str())
                    .bind(user_id.as_str()),
                "Mark draw entries acked",
            )
            .await?;

        Ok(())
    }

    async fn for_user(&self, user_id: &UserId)
        -> Result<Vec<DrawEntryAllocation>, DomainError> {
        let query = r#"
            SELECT
                draw_id,
                user_id,
                entry_count,
                acked_entries,
                submitted_points,
                tier_at_submission,
                updated_at
            FROM draw_entries
            WHERE user_id = ?1
            ORDER BY updated_at DESC
        "#;

        let rows: Vec<AllocationRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query).bind(user_id.as_str()),
                "List draw entries for user",
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.into_allocation()).collect())
    }

    async fn unacked(&self) -> Result<Vec<DrawEntryAllocation>, DomainError> {
        let query = r#"
            SELECT
                draw_id,
                user_id,
                entry_count,
                acked_entries,
                submitted_points,
                tier_at_submission,
                updated_at
            FROM draw_entries
            WHERE acked_entries < entry_count
            ORDER BY updated_at ASC
        "#;

        let rows: Vec<AllocationRow> = self
            .base
            .fetch_all(sqlx::query_as(query), "List unacked draw entries")
            .await?;

        Ok(rows.into_iter().map(|r| r.into_allocation()).collect())
    }
}
