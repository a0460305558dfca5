use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{UserAccount, UserStats};
use crate::shared::{DomainError, TierId, UserId};

/// One leaderboard position, ordered by lifetime points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub user_id: UserId,
    pub username: String,
    pub lifetime_points: i64,
    pub total_co2_saved: f64,
    pub total_activities: i64,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Save (upsert) a user account.
    async fn save(&self, user: &UserAccount) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError>;

    async fn find_all(&self) -> Result<Vec<UserAccount>, DomainError>;

    /// Write replay-derived aggregates in a single statement.
    async fn update_stats(&self, id: &UserId, stats: &UserStats) -> Result<(), DomainError>;

    async fn update_tier(&self, id: &UserId, tier_id: &TierId) -> Result<(), DomainError>;

    /// Atomically claim a due reset: zero monthly_points and advance the
    /// reset date, guarded by the date the caller observed. Returns false
    /// when another caller already claimed this period.
    async fn claim_reset(
        &self,
        id: &UserId,
        expected_due: DateTime<Utc>,
        next_due: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Users ordered by lifetime points, descending.
    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardRow>, DomainError>;

    /// 1-based rank by lifetime points, None for an unknown user.
    async fn rank_of(&self, id: &UserId) -> Result<Option<u32>, DomainError>;
}
