use async_trait::async_trait;

use super::SubscriptionTier;
use crate::shared::{DomainError, TierId};

/// Read-only access to tier reference data. Payment-method data never
/// passes through this engine.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn find_by_id(&self, id: &TierId) -> Result<Option<SubscriptionTier>, DomainError>;

    /// All tiers, cheapest first.
    async fn find_all(&self) -> Result<Vec<SubscriptionTier>, DomainError>;
}
