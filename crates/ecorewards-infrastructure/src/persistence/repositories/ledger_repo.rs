use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::SqliteRepositoryBase;
use ecorewards_domain::ledger::{ActivityEvent, LedgerRepository, SharingEvent, SharingPlatform};
use ecorewards_domain::shared::{
    ActivityEventId, ActivityTypeId, DomainError, SharingEventId, UserId,
};

#[derive(FromRow)]
struct ActivityRow {
    id: String,
    user_id: String,
    activity_type_id: String,
    quantity: f64,
    base_points: f64,
    tier_points: i64,
    co2_saved: f64,
    verified: bool,
    photo_ref: Option<String>,
    geo_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl ActivityRow {
    fn into_event(self) -> ActivityEvent {
        ActivityEvent::restore(
            ActivityEventId::from_string(&self.id),
            UserId::from_string(&self.user_id),
            ActivityTypeId::from_string(&self.activity_type_id),
            self.quantity,
            self.base_points,
            self.tier_points,
            self.co2_saved,
            self.verified,
            self.photo_ref,
            self.geo_ref,
            self.created_at,
        )
    }
}

#[derive(FromRow)]
struct SharingRow {
    id: String,
    user_id: String,
    platform: String,
    content_type: String,
    points_awarded: i64,
    created_at: DateTime<Utc>,
}

impl SharingRow {
    fn try_into_event(self) -> Result<SharingEvent, DomainError> {
        let platform = SharingPlatform::parse(&self.platform)?;
        Ok(SharingEvent::restore(
            SharingEventId::from_string(&self.id),
            UserId::from_string(&self.user_id),
            platform,
            self.content_type,
            self.points_awarded,
            self.created_at,
        ))
    }
}

pub struct SqliteLedgerRepository {
    base: SqliteRepositoryBase,
}

impl SqliteLedgerRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl LedgerRepository for SqliteLedgerRepository {
    async fn append_activity(
        &self,
        event: &ActivityEvent,
    ) -> Result<ActivityEventId, DomainError> {
        // Plain INSERT: the ledger is append-only, replacement is never valid.
        let query = r#"
            INSERT INTO activities (
                id,
                user_id,
                activity_type_id,
                quantity,
                base_points,
                tier_points,
                co2_saved,
                verified,
                photo_ref,
                geo_ref,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(event.id().as_str())
                    .bind(event.user_id().as_str())
                    .bind(event.activity_type_id().as_str())
                    .bind(event.quantity())
                    .bind(event.base_points())
                    .bind(event.tier_points())
                    .bind(event.co2_saved())
                    .bind(event.is_verified())
                    .bind(event.photo_ref())
                    .bind(event.geo_ref())
                    .bind(event.created_at()),
                "Append activity event",
            )
            .await?;

        Ok(event.id().clone())
    }

    async fn append_sharing(&self, event: &SharingEvent) -> Result<SharingEventId, DomainError> {
        let query = r#"
            INSERT INTO sharing_events (
                id,
                user_id,
                platform,
                content_type,
                points_awarded,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(event.id().as_str())
                    .bind(event.user_id().as_str())
                    .bind(event.platform().as_str())
                    .bind(event.content_type())
                    .bind(event.points_awarded())
                    .bind(event.created_at()),
                "Append sharing event",
            )
            .await?;

        Ok(event.id().clone())
    }

    async fn activities_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ActivityEvent>, DomainError> {
        let query = r#"
            SELECT
                id,
                user_id,
                activity_type_id,
                quantity,
                base_points,
                tier_points,
                co2_saved,
                verified,
                photo_ref,
                geo_ref,
                created_at
            FROM activities
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
        "#;

        let rows: Vec<ActivityRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query).bind(user_id.as_str()),
                "List activities for user",
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.into_event()).collect())
    }

    async fn sharing_for_user(&self, user_id: &UserId) -> Result<Vec<SharingEvent>, DomainError> {
        let query = r#"
            SELECT
                id,
                user_id,
                platform,
                content_type,
                points_awarded,
                created_at
            FROM sharing_events
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
        "#;

        let rows: Vec<SharingRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query).bind(user_id.as_str()),
                "List sharing events for user",
            )
            .await?;

        rows.into_iter().map(|r| r.try_into_event()).collect()
    }
}
