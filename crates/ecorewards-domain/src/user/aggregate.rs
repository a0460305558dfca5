use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::stats::UserStats;
use crate::reset::schedule;
use crate::shared::{DomainError, TierId, UserId};

/// A user's rewards account.
///
/// Lifetime counters (lifetime_points, total_co2_saved, total_activities)
/// are monotonic and never reset. monthly_points returns to zero exactly at
/// reset boundaries. Aggregates are only written by the points engine
/// (ledger replay) and the reset scheduler (claimed reset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    id: UserId,
    username: String,
    tier_id: TierId,
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

impl UserAccount {
    pub fn new(username: String, tier_id: TierId) -> Result<Self, DomainError> {
        if username.trim().is_empty() {
            return Err(DomainError::Validation(
                "Username cannot be empty".to_string(),
            ));
        }

        let created_at = Utc::now();
        let monthly_reset_date = schedule::advance_one_month(created_at, created_at.day());

        Ok(Self {
            id: UserId::new(),
            username: username.trim().to_string(),
            tier_id,
            monthly_points: 0,
            lifetime_points: 0,
            sharing_points: 0,
            total_co2_saved: 0.0,
            total_activities: 0,
            verified_activities: 0,
            current_streak: 0,
            monthly_reset_date,
            created_at,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: UserId,
        username: String,
        tier_id: TierId,
        monthly_points: i64,
        lifetime_points: i64,
        sharing_points: i64,
        total_co2_saved: f64,
        total_activities: i64,
        verified_activities: i64,
        current_streak: i64,
        monthly_reset_date: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
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
            created_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn tier_id(&self) -> &TierId {
        &self.tier_id
    }

    pub fn monthly_points(&self) -> i64 {
        self.monthly_points
    }

    pub fn lifetime_points(&self) -> i64 {
        self.lifetime_points
    }

    pub fn sharing_points(&self) -> i64 {
        self.sharing_points
    }

    pub fn total_co2_saved(&self) -> f64 {
        self.total_co2_saved
    }

    pub fn total_activities(&self) -> i64 {
        self.total_activities
    }

    pub fn verified_activities(&self) -> i64 {
        self.verified_activities
    }

    pub fn current_streak(&self) -> i64 {
        self.current_streak
    }

    pub fn monthly_reset_date(&self) -> DateTime<Utc> {
        self.monthly_reset_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Day-of-month every reset period is anchored to (signup day).
    pub fn reset_anchor_day(&self) -> u32 {
        self.created_at.day()
    }

    pub fn change_tier(&mut self, tier_id: TierId) {
        self.tier_id = tier_id;
    }

    /// Apply aggregates derived from a full ledger replay.
    ///
    /// Lifetime counters must not move backwards; a replay producing smaller
    /// values means events were lost, which is a data integrity failure.
    pub fn apply_stats(&mut self, stats: &UserStats) -> Result<(), DomainError> {
        if stats.lifetime_points < self.lifetime_points
            || stats.total_activities < self.total_activities
        {
            return Err(DomainError::Validation(format!(
                "Aggregate regression for user {}: lifetime {} -> {}, activities {} -> {}",
                self.id,
                self.lifetime_points,
                stats.lifetime_points,
                self.total_activities,
                stats.total_activities
            )));
        }

        self.monthly_points = stats.monthly_points;
        self.lifetime_points = stats.lifetime_points;
        self.sharing_points = stats.sharing_points;
        self.total_co2_saved = stats.total_co2_saved;
        self.total_activities = stats.total_activities;
        self.verified_activities = stats.verified_activities;
        self.current_streak = stats.current_streak;
        Ok(())
    }
}
