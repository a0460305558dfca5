use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{DomainError, ResetRecordId, UserId};

/// Audit record snapshotting what a period earned before it was zeroed.
/// Append-only; `reset_date` is the claimed due date, not the wall clock
/// of the caller that happened to win the claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyResetRecord {
    id: ResetRecordId,
    user_id: UserId,
    reset_date: DateTime<Utc>,
    points_before_reset: i64,
    activities_count: i64,
    sharing_count: i64,
    created_at: DateTime<Utc>,
}

impl MonthlyResetRecord {
    /// Window during which a completed reset is still worth notifying about.
    pub const NOTIFICATION_WINDOW_HOURS: i64 = 24;

    pub fn new(
        user_id: UserId,
        reset_date: DateTime<Utc>,
        points_before_reset: i64,
        activities_count: i64,
        sharing_count: i64,
    ) -> Result<Self, DomainError> {
        if points_before_reset < 0 || activities_count < 0 || sharing_count < 0 {
            return Err(DomainError::Validation(
                "Reset snapshot counts cannot be negative".to_string(),
            ));
        }

        Ok(Self {
            id: ResetRecordId::new(),
            user_id,
            reset_date,
            points_before_reset,
            activities_count,
            sharing_count,
            created_at: Utc::now(),
        })
    }

    pub fn restore(
        id: ResetRecordId,
        user_id: UserId,
        reset_date: DateTime<Utc>,
        points_before_reset: i64,
        activities_count: i64,
        sharing_count: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            reset_date,
            points_before_reset,
            activities_count,
            sharing_count,
            created_at,
        }
    }

    pub fn id(&self) -> &ResetRecordId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn reset_date(&self) -> DateTime<Utc> {
        self.reset_date
    }

    pub fn points_before_reset(&self) -> i64 {
        self.points_before_reset
    }

    pub fn activities_count(&self) -> i64 {
        self.activities_count
    }

    pub fn sharing_count(&self) -> i64 {
        self.sharing_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the "here's what you earned last month" decision window is
    /// still open (now - reset_date <= 24 hours).
    pub fn within_notification_window(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now.signed_duration_since(self.reset_date);
        elapsed >= Duration::zero()
            && elapsed <= Duration::hours(Self::NOTIFICATION_WINDOW_HOURS)
    }
}
