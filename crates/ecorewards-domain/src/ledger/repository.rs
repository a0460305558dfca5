use async_trait::async_trait;

use super::{ActivityEvent, ActivityType, SharingEvent};
use crate::shared::{ActivityEventId, ActivityTypeId, DomainError, SharingEventId, UserId};

#[async_trait]
pub trait ActivityTypeRepository: Send + Sync {
    async fn find_by_id(&self, id: &ActivityTypeId)
        -> Result<Option<ActivityType>, DomainError>;

    /// Full catalog, ordered by name.
    async fn find_all(&self) -> Result<Vec<ActivityType>, DomainError>;
}

/// Append-only event store; the sole source of truth for all aggregates.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn append_activity(&self, event: &ActivityEvent)
        -> Result<ActivityEventId, DomainError>;

    async fn append_sharing(&self, event: &SharingEvent)
        -> Result<SharingEventId, DomainError>;

    /// All activity events for a user, newest first. Finite and freely
    /// re-queryable.
    async fn activities_for_user(&self, user_id: &UserId)
        -> Result<Vec<ActivityEvent>, DomainError>;

    /// All sharing events for a user, newest first.
    async fn sharing_for_user(&self, user_id: &UserId)
        -> Result<Vec<SharingEvent>, DomainError>;
}
