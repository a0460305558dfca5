use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{instrument, warn};

use ecorewards_domain::events::{ActivityPointsAwarded, EventBus, SharingPointsAwarded};
use ecorewards_domain::ledger::{
    ActivityEvent, ActivityTypeRepository, LedgerRepository, PointsDomainService, SharingEvent,
    SharingPlatform,
};
use ecorewards_domain::reset::ResetRepository;
use ecorewards_domain::shared::{ActivityTypeId, DomainError, UserId};
use ecorewards_domain::subscription::{SubscriptionRepository, SubscriptionTier};
use ecorewards_domain::user::{UserRepository, UserStats};

use super::{AchievementEvaluator, DrawEntryAllocator};
use crate::dtos::PointsAwardResult;

/// Turns raw activity/sharing events into tier-adjusted points and keeps
/// the aggregates on the user row in sync with the ledger.
///
/// The ledger append and aggregate write fail loudly; achievement checks
/// and draw-entry submission are secondary paths that are logged and
/// retried on the next invocation instead.
pub struct PointsEngine {
    users: Arc<dyn UserRepository>,
    tiers: Arc<dyn SubscriptionRepository>,
    activity_types: Arc<dyn ActivityTypeRepository>,
    ledger: Arc<dyn LedgerRepository>,
    resets: Arc<dyn ResetRepository>,
    evaluator: Arc<AchievementEvaluator>,
    allocator: Arc<DrawEntryAllocator>,
    event_bus: Arc<dyn EventBus>,
}

impl PointsEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        tiers: Arc<dyn SubscriptionRepository>,
        activity_types: Arc<dyn ActivityTypeRepository>,
        ledger: Arc<dyn LedgerRepository>,
        resets: Arc<dyn ResetRepository>,
        evaluator: Arc<AchievementEvaluator>,
        allocator: Arc<DrawEntryAllocator>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            users,
            tiers,
            activity_types,
            ledger,
            resets,
            evaluator,
            allocator,
            event_bus,
        }
    }

    /// Whether activities currently earn this user any points. Callers
    /// should warn free-tier users before logging: the event and its CO2
    /// credit are still recorded, but tier points stay at zero.
    pub async fn can_earn_activity_points(&self, user_id: &UserId) -> Result<bool, DomainError> {
        let tier = self.tier_for_user(user_id).await?;
        Ok(!tier.is_free())
    }

    #[instrument(skip(self), fields(user_id = %user_id, activity_type = %activity_type_id))]
    pub async fn award_activity_points(
        &self,
        user_id: &UserId,
        activity_type_id: &ActivityTypeId,
        quantity: f64,
        verified: bool,
        photo_ref: Option<String>,
        geo_ref: Option<String>,
    ) -> Result<PointsAwardResult, DomainError> {
        // Validation happens before anything touches the store.
        PointsDomainService::validate_quantity(quantity)?;

        let activity_type = self
            .activity_types
            .find_by_id(activity_type_id)
            .await?
            .ok_or_else(|| DomainError::ActivityTypeNotFound(activity_type_id.to_string()))?;
        let tier = self.tier_for_user(user_id).await?;

        let event = ActivityEvent::record(
            user_id.clone(),
            &activity_type,
            quantity,
            tier.point_multiplier(),
            verified,
            photo_ref,
            geo_ref,
        )?;

        self.ledger.append_activity(&event).await?;
        let stats = self.recompute_stats(user_id).await?;

        let newly_unlocked = self.check_achievements_logged(user_id).await;

        if event.tier_points() > 0 {
            self.allocator
                .submit_user_entries_detached(user_id.clone(), event.tier_points());
        }

        self.publish_logged(Box::new(ActivityPointsAwarded {
            user_id: user_id.clone(),
            event_id: event.id().clone(),
            tier_points: event.tier_points(),
            co2_saved: event.co2_saved(),
            occurred_at: Utc::now(),
        }))
        .await;

        Ok(PointsAwardResult {
            event_id: event.id().to_string(),
            points_awarded: event.tier_points(),
            base_points: event.base_points(),
            co2_saved: event.co2_saved(),
            tier_name: tier.name().to_string(),
            tier_multiplier: tier.point_multiplier(),
            stats,
            newly_unlocked,
        })
    }

    /// Sharing credits exactly one point on every tier. For free-tier
    /// users this is the only point source.
    #[instrument(skip(self), fields(user_id = %user_id, platform = platform))]
    pub async fn award_sharing_points(
        &self,
        user_id: &UserId,
        platform: &str,
        content_type: &str,
    ) -> Result<PointsAwardResult, DomainError> {
        let platform = SharingPlatform::parse(platform)?;
        let tier = self.tier_for_user(user_id).await?;

        let event = SharingEvent::record(user_id.clone(), platform, content_type.to_string());

        self.ledger.append_sharing(&event).await?;
        let stats = self.recompute_stats(user_id).await?;

        let newly_unlocked = self.check_achievements_logged(user_id).await;

        self.allocator
            .submit_user_entries_detached(user_id.clone(), event.points_awarded());

        self.publish_logged(Box::new(SharingPointsAwarded {
            user_id: user_id.clone(),
            event_id: event.id().clone(),
            platform: platform.as_str().to_string(),
            occurred_at: Utc::now(),
        }))
        .await;

        Ok(PointsAwardResult {
            event_id: event.id().to_string(),
            points_awarded: event.points_awarded(),
            base_points: event.points_awarded() as f64,
            co2_saved: 0.0,
            tier_name: tier.name().to_string(),
            tier_multiplier: tier.point_multiplier(),
            stats,
            newly_unlocked,
        })
    }

    /// Replay the full event ledger for this user and write the derived
    /// aggregates. Idempotent: no new events, identical result. This is
    /// the single authoritative path for aggregate updates; nothing else
    /// increments counters.
    pub async fn recompute_stats(&self, user_id: &UserId) -> Result<UserStats, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        // The current period starts at the last claimed reset, or at
        // signup for a never-reset account.
        let period_start = self
            .resets
            .latest_for_user(user_id)
            .await?
            .map(|r| r.reset_date())
            .unwrap_or_else(|| user.created_at());

        let activities = self.ledger.activities_for_user(user_id).await?;
        let sharing = self.ledger.sharing_for_user(user_id).await?;

        let lifetime_activity_points: i64 = activities.iter().map(|a| a.tier_points()).sum();
        let sharing_points: i64 = sharing.iter().map(|s| s.points_awarded()).sum();

        let monthly_activity_points: i64 = activities
            .iter()
            .filter(|a| a.created_at() >= period_start)
            .map(|a| a.tier_points())
            .sum();
        let monthly_sharing_points: i64 = sharing
            .iter()
            .filter(|s| s.created_at() >= period_start)
            .map(|s| s.points_awarded())
            .sum();

        let activity_days: Vec<_> = activities
            .iter()
            .map(|a| a.created_at().date_naive())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let stats = UserStats {
            monthly_points: monthly_activity_points + monthly_sharing_points,
            lifetime_points: lifetime_activity_points + sharing_points,
            sharing_points,
            total_co2_saved: activities.iter().map(|a| a.co2_saved()).sum(),
            total_activities: activities.len() as i64,
            verified_activities: activities.iter().filter(|a| a.is_verified()).count() as i64,
            current_streak: PointsDomainService::current_streak(
                &activity_days,
                Utc::now().date_naive(),
            ),
        };

        self.users.update_stats(user_id, &stats).await?;
        Ok(stats)
    }

    async fn tier_for_user(&self, user_id: &UserId) -> Result<SubscriptionTier, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        self.tiers
            .find_by_id(user.tier_id())
            .await?
            .ok_or_else(|| DomainError::TierNotFound(user.tier_id().to_string()))
    }

    /// Achievement evaluation is idempotent, so a failure here only delays
    /// the unlock until the next award.
    async fn check_achievements_logged(
        &self,
        user_id: &UserId,
    ) -> Vec<crate::dtos::UnlockedAchievement> {
        match self.evaluator.check_achievements(user_id).await {
            Ok(unlocked) => unlocked,
            Err(e) => {
                warn!("Achievement check failed for {}: {}", user_id, e);
                Vec::new()
            }
        }
    }

    async fn publish_logged(&self, event: Box<dyn ecorewards_domain::DomainEvent>) {
        if let Err(e) = self.event_bus.publish(event).await {
            warn!("Event publish failed: {}", e);
        }
    }
}
