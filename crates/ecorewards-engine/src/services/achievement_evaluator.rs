use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use ecorewards_domain::achievement::{AchievementDomainService, AchievementRepository};
use ecorewards_domain::events::{AchievementUnlocked, EventBus};
use ecorewards_domain::shared::{DomainError, UserId};
use ecorewards_domain::user::{UserRepository, UserStats};

use crate::dtos::UnlockedAchievement;

/// Compares replay-derived aggregates against the achievement definition
/// set and unlocks idempotently. The (user, achievement) uniqueness
/// constraint makes a concurrent duplicate attempt a silent no-op; only
/// rows this call actually inserted come back as newly unlocked.
pub struct AchievementEvaluator {
    users: Arc<dyn UserRepository>,
    achievements: Arc<dyn AchievementRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl AchievementEvaluator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        achievements: Arc<dyn AchievementRepository>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            users,
            achievements,
            event_bus,
        }
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn check_achievements(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UnlockedAchievement>, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        let stats = UserStats {
            monthly_points: user.monthly_points(),
            lifetime_points: user.lifetime_points(),
            sharing_points: user.sharing_points(),
            total_co2_saved: user.total_co2_saved(),
            total_activities: user.total_activities(),
            verified_activities: user.verified_activities(),
            current_streak: user.current_streak(),
        };

        let definitions = self.achievements.definitions().await?;
        let already_unlocked: HashSet<String> = self
            .achievements
            .unlocks_for_user(user_id)
            .await?
            .into_iter()
            .map(|u| u.achievement_id().as_str().to_string())
            .collect();

        let mut newly_unlocked = Vec::new();

        for definition in definitions {
            if already_unlocked.contains(definition.id().as_str()) {
                continue;
            }
            if !AchievementDomainService::is_satisfied(&definition, &stats) {
                continue;
            }

            let unlocked_at = Utc::now();
            let inserted = self
                .achievements
                .try_unlock(user_id, definition.id(), unlocked_at)
                .await?;

            // A concurrent caller inserted first; not ours to report.
            if !inserted {
                continue;
            }

            info!("🏆 {} unlocked '{}'", user_id, definition.name());

            if let Err(e) = self
                .event_bus
                .publish(Box::new(AchievementUnlocked {
                    user_id: user_id.clone(),
                    achievement_id: definition.id().clone(),
                    achievement_name: definition.name().to_string(),
                    occurred_at: unlocked_at,
                }))
                .await
            {
                warn!("Event publish failed: {}", e);
            }

            newly_unlocked.push(UnlockedAchievement {
                achievement_id: definition.id().clone(),
                name: definition.name().to_string(),
                description: definition.description().to_string(),
                unlocked_at,
            });
        }

        Ok(newly_unlocked)
    }
}
