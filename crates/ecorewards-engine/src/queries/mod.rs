use chrono::Utc;
use std::sync::Arc;

use ecorewards_domain::ledger::{ActivityType, ActivityTypeRepository, SharingPlatform};
use ecorewards_domain::reset::schedule;
use ecorewards_domain::shared::{DomainError, UserId};
use ecorewards_domain::subscription::SubscriptionRepository;
use ecorewards_domain::user::{LeaderboardRow, UserRepository};

use crate::dtos::UserSummary;

/// Read-side queries for display collaborators. Nothing here mutates
/// state or formats strings.
pub struct StatsQueries {
    users: Arc<dyn UserRepository>,
    tiers: Arc<dyn SubscriptionRepository>,
    activity_types: Arc<dyn ActivityTypeRepository>,
}

impl StatsQueries {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tiers: Arc<dyn SubscriptionRepository>,
        activity_types: Arc<dyn ActivityTypeRepository>,
    ) -> Self {
        Self {
            users,
            tiers,
            activity_types,
        }
    }

    /// Top users by lifetime points.
    pub async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardRow>, DomainError> {
        self.users.leaderboard(limit).await
    }

    /// 1-based leaderboard position, None for an unknown user.
    pub async fn user_rank(&self, user_id: &UserId) -> Result<Option<u32>, DomainError> {
        self.users.rank_of(user_id).await
    }

    /// Loggable activity catalog, ordered by name.
    pub async fn activity_catalog(&self) -> Result<Vec<ActivityType>, DomainError> {
        self.activity_types.find_all().await
    }

    /// Platforms sharing points can be earned on.
    pub fn sharing_platforms(&self) -> Vec<SharingPlatform> {
        SharingPlatform::ALL.to_vec()
    }

    /// Aggregates, tier and reset countdown in one read.
    pub async fn user_summary(&self, user_id: &UserId) -> Result<UserSummary, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        let tier = self
            .tiers
            .find_by_id(user.tier_id())
            .await?
            .ok_or_else(|| DomainError::TierNotFound(user.tier_id().to_string()))?;

        let now = Utc::now();

        Ok(UserSummary {
            user_id: user.id().clone(),
            username: user.username().to_string(),
            tier_id: user.tier_id().as_str().to_string(),
            tier_name: tier.name().to_string(),
            tier_multiplier: tier.point_multiplier(),
            monthly_points: user.monthly_points(),
            lifetime_points: user.lifetime_points(),
            sharing_points: user.sharing_points(),
            total_co2_saved: user.total_co2_saved(),
            total_activities: user.total_activities(),
            current_streak: user.current_streak(),
            monthly_reset_date: user.monthly_reset_date(),
            days_until_reset: schedule::days_until(now, user.monthly_reset_date()),
            reset_progress: schedule::reset_progress(now),
        })
    }
}
