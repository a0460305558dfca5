use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use ecorewards_domain::events::{EventBus, MonthlyResetPerformed};
use ecorewards_domain::ledger::LedgerRepository;
use ecorewards_domain::reset::{schedule, MonthlyResetRecord, ResetPhase, ResetProgress,
    ResetRepository};
use ecorewards_domain::shared::{DomainError, UserId};
use ecorewards_domain::user::UserRepository;

use crate::dtos::{ResetCheckOutcome, ResetSummary};

/// Detects and performs the per-user monthly reset.
///
/// The reset itself is a single conditional claim on the observed reset
/// date: monthly_points is zeroed and the date advanced in one guarded
/// UPDATE, so concurrent callers cannot double-reset. Lifetime counters
/// are never touched.
pub struct MonthlyResetScheduler {
    users: Arc<dyn UserRepository>,
    ledger: Arc<dyn LedgerRepository>,
    resets: Arc<dyn ResetRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl MonthlyResetScheduler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        ledger: Arc<dyn LedgerRepository>,
        resets: Arc<dyn ResetRepository>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            users,
            ledger,
            resets,
            event_bus,
        }
    }

    /// Caller-facing entry point, invoked e.g. on app foreground.
    ///
    /// Performs at most one reset. The prior period's summary rides along
    /// while the 24h notification window is open, so a UI collaborator can
    /// show "here's what you earned last month".
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn check_and_reset_user(
        &self,
        user_id: &UserId,
    ) -> Result<ResetCheckOutcome, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        let now = Utc::now();
        let mut reset_performed = false;

        if ResetPhase::classify(now, user.monthly_reset_date()) == ResetPhase::ResetDue {
            match self.perform_reset(user_id).await {
                Ok(_) => reset_performed = true,
                // Another device/caller won the claim; their reset counts.
                Err(DomainError::ConcurrencyConflict(msg)) => {
                    debug!("Reset claim lost for {}: {}", user_id, msg);
                }
                Err(e) => return Err(e),
            }
        }

        let prior_period = self
            .resets
            .latest_for_user(user_id)
            .await?
            .filter(|r| r.within_notification_window(now))
            .map(|r| ResetSummary {
                reset_date: r.reset_date(),
                points_before_reset: r.points_before_reset(),
                activities_count: r.activities_count(),
                sharing_count: r.sharing_count(),
            });

        Ok(ResetCheckOutcome {
            reset_performed,
            prior_period,
        })
    }

    /// Perform one due reset: snapshot the ending period into an audit
    /// record, zero monthly_points, and advance the reset date one
    /// calendar month (anchored to the signup day, clamped to shorter
    /// months). Losing the claim surfaces as ConcurrencyConflict, which
    /// callers treat as success-no-op.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn perform_reset(
        &self,
        user_id: &UserId,
    ) -> Result<MonthlyResetRecord, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        let now = Utc::now();
        let due = user.monthly_reset_date();

        if ResetPhase::classify(now, due) != ResetPhase::ResetDue {
            return Err(DomainError::Validation(format!(
                "Reset for user {} is not due until {}",
                user_id, due
            )));
        }

        // Snapshot the ending period from the ledger, not from possibly
        // stale counters.
        let period_start = self
            .resets
            .latest_for_user(user_id)
            .await?
            .map(|r| r.reset_date())
            .unwrap_or_else(|| user.created_at());

        let activities = self.ledger.activities_for_user(user_id).await?;
        let sharing = self.ledger.sharing_for_user(user_id).await?;

        let period_activities: Vec<_> = activities
            .iter()
            .filter(|a| a.created_at() >= period_start && a.created_at() < due)
            .collect();
        let period_sharing: Vec<_> = sharing
            .iter()
            .filter(|s| s.created_at() >= period_start && s.created_at() < due)
            .collect();

        let points_before_reset: i64 = period_activities
            .iter()
            .map(|a| a.tier_points())
            .sum::<i64>()
            + period_sharing.iter().map(|s| s.points_awarded()).sum::<i64>();

        let next_due = schedule::advance_one_month(due, user.reset_anchor_day());

        let claimed = self.users.claim_reset(user_id, due, next_due).await?;
        if !claimed {
            return Err(DomainError::ConcurrencyConflict(format!(
                "Reset for period ending {} already claimed",
                due
            )));
        }

        let record = MonthlyResetRecord::new(
            user_id.clone(),
            due,
            points_before_reset,
            period_activities.len() as i64,
            period_sharing.len() as i64,
        )?;
        self.resets.record_reset(&record).await?;

        info!(
            "📅 Monthly reset for {}: {} points banked, next due {}",
            user_id, points_before_reset, next_due
        );

        if let Err(e) = self
            .event_bus
            .publish(Box::new(MonthlyResetPerformed {
                user_id: user_id.clone(),
                reset_date: due,
                points_before_reset,
                occurred_at: now,
            }))
            .await
        {
            warn!("Event publish failed: {}", e);
        }

        Ok(record)
    }

    /// Whole days until this user's next reset, for countdown displays.
    pub async fn days_until_reset(&self, user_id: &UserId) -> Result<i64, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        Ok(schedule::days_until(Utc::now(), user.monthly_reset_date()))
    }

    /// Calendar-month progress, shared by all users.
    pub fn reset_progress(&self) -> ResetProgress {
        schedule::reset_progress(Utc::now())
    }
}
