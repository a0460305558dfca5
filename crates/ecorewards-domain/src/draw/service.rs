use async_trait::async_trait;

use super::{Draw, DrawEntryAllocation, DrawEntryCount, WinnerRecord};
use crate::shared::{DomainError, DrawId, TierId, UserId};

/// Contract with the external prize-draw backend. Implementations apply a
/// bounded timeout; callers degrade to a no-op rather than hanging.
#[async_trait]
pub trait DrawService: Send + Sync {
    /// Currently open and upcoming draws.
    async fn get_open_draws(&self) -> Result<Vec<Draw>, DomainError>;

    /// Submit entries for a user. Idempotent on the service side keyed by
    /// (draw, user, submitted total).
    async fn submit_entries(
        &self,
        draw_id: &DrawId,
        user_id: &UserId,
        entry_count: i64,
    ) -> Result<(), DomainError>;

    /// Per-user entry counts for a draw.
    async fn get_entries(&self, draw_id: &DrawId) -> Result<Vec<DrawEntryCount>, DomainError>;

    async fn get_recent_winners(&self) -> Result<Vec<WinnerRecord>, DomainError>;
}

/// Local allocation store backing fire-and-forget submission and retry.
#[async_trait]
pub trait DrawEntryRepository: Send + Sync {
    /// Add entries to the (draw, user) allocation, creating it on first use.
    async fn add_entries(
        &self,
        draw_id: &DrawId,
        user_id: &UserId,
        entries: i64,
        points: i64,
        tier_id: &TierId,
    ) -> Result<(), DomainError>;

    /// Record that the service has acknowledged every entry allocated so
    /// far for this (draw, user).
    async fn mark_acked(&self, draw_id: &DrawId, user_id: &UserId) -> Result<(), DomainError>;

    async fn for_user(&self, user_id: &UserId)
        -> Result<Vec<DrawEntryAllocation>, DomainError>;

    /// Allocations with entries the service has not acknowledged yet.
    async fn unacked(&self) -> Result<Vec<DrawEntryAllocation>, DomainError>;
}
