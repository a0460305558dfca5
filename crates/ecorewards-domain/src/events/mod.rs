use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::shared::{AchievementId, ActivityEventId, DomainError, DrawId, SharingEventId, UserId};

/// Base trait for all domain events
/// All events must be Send + Sync for thread safety
pub trait DomainEvent: Send + Sync + Any {
    /// Convert to Any for type-safe downcasting
    fn as_any(&self) -> &(dyn Any + Send + Sync);

    fn event_type_name(&self) -> &'static str;
}

/// Event bus trait for publishing domain events
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError>;
}

/// Macro to implement DomainEvent trait with type name
macro_rules! impl_domain_event {
    ($type:ty) => {
        impl DomainEvent for $type {
            fn as_any(&self) -> &(dyn Any + Send + Sync) {
                self
            }

            fn event_type_name(&self) -> &'static str {
                std::any::type_name::<Self>()
            }
        }
    };
}

/// Fired after an activity event lands in the ledger and aggregates are
/// recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPointsAwarded {
    pub user_id: UserId,
    pub event_id: ActivityEventId,
    pub tier_points: i64,
    pub co2_saved: f64,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(ActivityPointsAwarded);

/// Fired after a sharing event lands in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharingPointsAwarded {
    pub user_id: UserId,
    pub event_id: SharingEventId,
    pub platform: String,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(SharingPointsAwarded);

/// Fired once per achievement actually unlocked (never for duplicate
/// attempts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementUnlocked {
    pub user_id: UserId,
    pub achievement_id: AchievementId,
    pub achievement_name: String,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(AchievementUnlocked);

/// Fired by the caller that won the reset claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyResetPerformed {
    pub user_id: UserId,
    pub reset_date: DateTime<Utc>,
    pub points_before_reset: i64,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(MonthlyResetPerformed);

/// Fired after entries are recorded against an open draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawEntriesSubmitted {
    pub user_id: UserId,
    pub draw_id: DrawId,
    pub entries_added: i64,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(DrawEntriesSubmitted);
