use async_trait::async_trait;

use super::MonthlyResetRecord;
use crate::shared::{DomainError, UserId};

#[async_trait]
pub trait ResetRepository: Send + Sync {
    /// Append a reset audit record.
    async fn record_reset(&self, record: &MonthlyResetRecord) -> Result<(), DomainError>;

    /// Most recent reset for a user, by reset date.
    async fn latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<MonthlyResetRecord>, DomainError>;

    /// Full reset history for a user, newest first.
    async fn history_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<MonthlyResetRecord>, DomainError>;
}
