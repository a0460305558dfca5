use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::SqliteRepositoryBase;
use ecorewards_domain::shared::{DomainError, TierId, UserId};
use ecorewards_domain::user::{LeaderboardRow, UserAccount, UserRepository, UserStats};

#[derive(FromRow)]
struct UserRow {
    id: String,
    username: String,
    tier_id: String,
    monthly_points: i64,
    lifetime_points: i64,
    sharing_points: i64,
    total_co2_saved: f64,
    total_activities: i64,
    verified_activities: i64,
    current_streak: i64,
    monthly_reset_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_account(self) -> UserAccount {
        UserAccount::restore(
            UserId::from_string(&self.id),
            self.username,
            TierId::from_string(&self.tier_id),
            self.monthly_points,
            self.lifetime_points,
            self.sharing_points,
            self.total_co2_saved,
            self.total_activities,
            self.verified_activities,
            self.current_streak,
            self.monthly_reset_date,
            self.created_at,
        )
    }
}

#[derive(FromRow)]
struct LeaderboardDbRow {
    id: String,
    username: String,
    lifetime_points: i64,
    total_co2_saved: f64,
    total_activities: i64,
}

pub struct SqliteUserRepository {
    base: SqliteRepositoryBase,
}

impl SqliteUserRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

const USER_COLUMNS: &str = r#"
    id,
    username,
    tier_id,
    monthly_points,
    lifetime_points,
    sharing_points,
    total_co2_saved,
    total_activities,
    verified_activities,
    current_streak,
    monthly_reset_date,
    created_at
"#;

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn save(&self, user: &UserAccount) -> Result<(), DomainError> {
        let query = r#"
            INSERT OR REPLACE INTO users (
                id,
                username,
                tier_id,
                monthly_points,
                lifetime_points,
                sharing_points,
                total_co2_saved,
                total_activities,
                verified_activities,
                current_streak,
                monthly_reset_date,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(user.id().as_str())
                    .bind(user.username())
                    .bind(user.tier_id().as_str())
                    .bind(user.monthly_points())
                    .bind(user.lifetime_points())
                    .bind(user.sharing_points())
                    .bind(user.total_co2_saved())
                    .bind(user.total_activities())
                    .bind(user.verified_activities())
                    .bind(user.current_streak())
                    .bind(user.monthly_reset_date())
                    .bind(user.created_at()),
                "Save user",
            )
            .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");

        let row: Option<UserRow> = self
            .base
            .fetch_optional(sqlx::query_as(&query).bind(id.as_str()), "Find user by ID")
            .await?;

        Ok(row.map(|r| r.into_account()))
    }

    async fn find_all(&self) -> Result<Vec<UserAccount>, DomainError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");

        let rows: Vec<UserRow> = self
            .base
            .fetch_all(sqlx::query_as(&query), "List users")
            .await?;

        Ok(rows.into_iter().map(|r| r.into_account()).collect())
    }

    async fn update_stats(&self, id: &UserId, stats: &UserStats) -> Result<(), DomainError> {
        let query = r#"
            UPDATE users SET
                monthly_points = ?2,
                lifetime_points = ?3,
                sharing_points = ?4,
                total_co2_saved = ?5,
                total_activities = ?6,
                verified_activities = ?7,
                current_streak = ?8
            WHERE id = ?1
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(id.as_str())
                    .bind(stats.monthly_points)
                    .bind(stats.lifetime_points)
                    .bind(stats.sharing_points)
                    .bind(stats.total_co2_saved)
                    .bind(stats.total_activities)
                    .bind(stats.verified_activities)
                    .bind(stats.current_streak),
                "Update user stats",
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn update_tier(&self, id: &UserId, tier_id: &TierId) -> Result<(), DomainError> {
        let result = self
            .base
            .execute(
                sqlx::query("UPDATE users SET tier_id = ?2 WHERE id = ?1")
                    .bind(id.as_str())
                    .bind(tier_id.as_str()),
                "Update user tier",
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn claim_reset(
        &self,
        id: &UserId,
        expected_due: DateTime<Utc>,
        next_due: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        // The WHERE clause on the observed due date is the claim: of any
        // number of concurrent callers exactly one matches and flips the row.
        let query = r#"
            UPDATE users SET
                monthly_points = 0,
                monthly_reset_date = ?3
            WHERE id = ?1 AND monthly_reset_date = ?2
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(id.as_str())
                    .bind(expected_due)
                    .bind(next_due),
                "Claim monthly reset",
            )
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardRow>, DomainError> {
        let query = r#"
            SELECT
                id,
                username,
                lifetime_points,
                total_co2_saved,
                total_activities
            FROM users
            ORDER BY lifetime_points DESC, created_at ASC
            LIMIT ?1
        "#;

        let rows: Vec<LeaderboardDbRow> = self
            .base
            .fetch_all(sqlx::query_as(query).bind(limit as i64), "Leaderboard")
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| LeaderboardRow {
                user_id: UserId::from_string(&r.id),
                username: r.username,
                lifetime_points: r.lifetime_points,
                total_co2_saved: r.total_co2_saved,
                total_activities: r.total_activities,
            })
            .collect())
    }

    async fn rank_of(&self, id: &UserId) -> Result<Option<u32>, DomainError> {
        let query = r#"
            SELECT COUNT(*) + 1
            FROM users
            WHERE lifetime_points > (SELECT lifetime_points FROM users WHERE id = ?1)
        "#;

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(self.base.pool())
            .await
            .map_err(|e| DomainError::Repository(format!("Rank lookup: {e}")))?;

        if exists.is_none() {
            return Ok(None);
        }

        let rank: i64 = sqlx::query_scalar(query)
            .bind(id.as_str())
            .fetch_one(self.base.pool())
            .await
            .map_err(|e| DomainError::Repository(format!("Rank lookup: {e}")))?;

        Ok(Some(rank as u32))
    }
}
