use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{AchievementDefinition, AchievementUnlock};
use crate::shared::{AchievementId, DomainError, UserId};

#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Full definition set, ordered by threshold value.
    async fn definitions(&self) -> Result<Vec<AchievementDefinition>, DomainError>;

    /// Existing unlocks for a user, newest first.
    async fn unlocks_for_user(&self, user_id: &UserId)
        -> Result<Vec<AchievementUnlock>, DomainError>;

    /// Insert an unlock unless the (user, achievement) pair already exists.
    /// Returns true only when this call actually inserted the row, so a
    /// concurrent duplicate attempt reads as false, never as an error.
    async fn try_unlock(
        &self,
        user_id: &UserId,
        achievement_id: &AchievementId,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;
}
