use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ecorewards_domain::draw::DrawKind;
use ecorewards_domain::reset::ResetProgress;
use ecorewards_domain::shared::{AchievementId, DrawId, UserId};
use ecorewards_domain::user::UserStats;

/// An achievement that was actually unlocked by this call (duplicates
/// filtered out at the store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub achievement_id: AchievementId,
    pub name: String,
    pub description: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Outcome of one award operation, for the notification collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsAwardResult {
    pub event_id: String,
    /// Tier-adjusted points this event earned (1 for sharing, 0 on the
    /// free tier's activities).
    pub points_awarded: i64,
    pub base_points: f64,
    pub co2_saved: f64,
    pub tier_name: String,
    pub tier_multiplier: f64,
    /// Aggregates after the ledger replay triggered by this award.
    pub stats: UserStats,
    pub newly_unlocked: Vec<UnlockedAchievement>,
}

/// What last period earned, shown in the post-reset notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetSummary {
    pub reset_date: DateTime<Utc>,
    pub points_before_reset: i64,
    pub activities_count: i64,
    pub sharing_count: i64,
}

/// Result of a foreground reset check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetCheckOutcome {
    /// Whether this call performed the reset (false when the period is
    /// still active or another caller won the claim).
    pub reset_performed: bool,
    /// Prior period summary, present only within the 24h notification
    /// window after the reset date.
    pub prior_period: Option<ResetSummary>,
}

/// One draw the allocator pushed entries into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawSubmission {
    pub draw_id: DrawId,
    pub kind: DrawKind,
    pub entries_added: i64,
    /// False when the Draw Service call failed; the local allocation
    /// stays pending for retry.
    pub acked: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawEntrySummary {
    pub submissions: Vec<DrawSubmission>,
    pub total_entries: i64,
}

/// Time remaining until a draw closes, for countdown displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawCountdown {
    pub draw_id: DrawId,
    pub kind: DrawKind,
    pub close_date: DateTime<Utc>,
    pub remaining_ms: i64,
    pub prize_usd_amount: f64,
    pub crypto_symbol: String,
}

/// Everything a profile screen needs in one read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub username: String,
    pub tier_id: String,
    pub tier_name: String,
    pub tier_multiplier: f64,
    pub monthly_points: i64,
    pub lifetime_points: i64,
    pub sharing_points: i64,
    pub total_co2_saved: f64,
    pub total_activities: i64,
    pub current_streak: i64,
    pub monthly_reset_date: DateTime<Utc>,
    pub days_until_reset: i64,
    pub reset_progress: ResetProgress,
}
