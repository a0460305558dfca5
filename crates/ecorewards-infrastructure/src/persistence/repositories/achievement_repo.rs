use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::SqliteRepositoryBase;
use ecorewards_domain::achievement::{
    AchievementDefinition, AchievementRepository, AchievementUnlock, ThresholdKind,
};
use ecorewards_domain::shared::{AchievementId, DomainError, UserId};

#[derive(FromRow)]
struct DefinitionRow {
    id: String,
    name: String,
    description: String,
    threshold_kind: String,
    threshold_value: f64,
}

impl DefinitionRow {
    fn try_into_definition(self) -> Result<AchievementDefinition, DomainError> {
        let kind = ThresholdKind::parse(&self.threshold_kind)?;
        Ok(AchievementDefinition::restore(
            AchievementId::from_string(&self.id),
            self.name,
            self.description,
            kind,
            self.threshold_value,
        ))
    }
}

#[derive(FromRow)]
struct UnlockRow {
    user_id: String,
    achievement_id: String,
    unlocked_at: DateTime<Utc>,
}

impl UnlockRow {
    fn into_unlock(self) -> AchievementUnlock {
        AchievementUnlock::restore(
            UserId::from_string(&self.user_id),
            AchievementId::from_string(&self.achievement_id),
            self.unlocked_at,
        )
    }
}

pub struct SqliteAchievementRepository {
    base: SqliteRepositoryBase,
}

impl SqliteAchievementRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl AchievementRepository for SqliteAchievementRepository {
    async fn definitions(&self) -> Result<Vec<AchievementDefinition>, DomainError> {
        let query = r#"
            SELECT id, name, description, threshold_kind, threshold_value
            FROM achievements
            ORDER BY threshold_value ASC
        "#;

        let rows: Vec<DefinitionRow> = self
            .base
            .fetch_all(sqlx::query_as(query), "List achievement definitions")
            .await?;

        rows.into_iter().map(|r| r.try_into_definition()).collect()
    }

    async fn unlocks_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AchievementUnlock>, DomainError> {
        let query = r#"
            SELECT user_id, achievement_id, unlocked_at
            FROM user_achievements
            WHERE user_id = ?1
            ORDER BY unlocked_at DESC
        "#;

        let rows: Vec<UnlockRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query).bind(user_id.as_str()),
                "List unlocks for user",
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.into_unlock()).collect())
    }

    async fn try_unlock(
        &self,
        user_id: &UserId,
        achievement_id: &AchievementId,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        // OR IGNORE + rows_affected turns a duplicate (concurrent retry)
        // into false rather than a constraint error.
        let query = r#"
            INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, unlocked_at)
            VALUES (?1, ?2, ?3)
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(user_id.as_str())
                    .bind(achievement_id.as_str())
                    .bind(unlocked_at),
                "Unlock achievement",
            )
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
