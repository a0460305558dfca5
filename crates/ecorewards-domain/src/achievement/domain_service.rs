use super::{AchievementDefinition, ThresholdKind};
use crate::user::UserStats;

/// Pure threshold evaluation against replay-derived aggregates.
pub struct AchievementDomainService;

impl AchievementDomainService {
    /// The "log your first activity" achievement unlocks on the first
    /// activity regardless of its declared threshold fields. Carried over
    /// from the original behavior; see DESIGN.md before changing.
    pub const FIRST_ACTIVITY_ACHIEVEMENT: &'static str = "First Steps";

    pub fn is_satisfied(definition: &AchievementDefinition, stats: &UserStats) -> bool {
        if definition.name() == Self::FIRST_ACTIVITY_ACHIEVEMENT && stats.total_activities >= 1 {
            return true;
        }

        let threshold = definition.threshold_value();
        match definition.threshold_kind() {
            ThresholdKind::Points => stats.lifetime_points as f64 >= threshold,
            ThresholdKind::Activities => stats.total_activities as f64 >= threshold,
            ThresholdKind::Co2 => stats.total_co2_saved >= threshold,
            ThresholdKind::Special => stats.verified_activities as f64 >= threshold,
        }
    }
}
