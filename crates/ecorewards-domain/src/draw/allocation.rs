use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{DrawId, TierId, UserId};

/// Local record of entries a user holds in one draw. One row per
/// (draw, user); incremented every time points are submitted against an
/// open draw. `acked_entries` tracks how many entries the Draw Service has
/// acknowledged, so a failed submission stays eligible for retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawEntryAllocation {
    draw_id: DrawId,
    user_id: UserId,
    entry_count: i64,
    acked_entries: i64,
    submitted_points: i64,
    tier_at_submission: TierId,
    updated_at: DateTime<Utc>,
}

impl DrawEntryAllocation {
    pub fn restore(
        draw_id: DrawId,
        user_id: UserId,
        entry_count: i64,
        acked_entries: i64,
        submitted_points: i64,
        tier_at_submission: TierId,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            draw_id,
            user_id,
            entry_count,
            acked_entries,
            submitted_points,
            tier_at_submission,
            updated_at,
        }
    }

    pub fn draw_id(&self) -> &DrawId {
        &self.draw_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn entry_count(&self) -> i64 {
        self.entry_count
    }

    pub fn acked_entries(&self) -> i64 {
        self.acked_entries
    }

    pub fn submitted_points(&self) -> i64 {
        self.submitted_points
    }

    pub fn tier_at_submission(&self) -> &TierId {
        &self.tier_at_submission
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Entries recorded locally but not yet acknowledged by the service.
    pub fn pending_entries(&self) -> i64 {
        (self.entry_count - self.acked_entries).max(0)
    }
}
