use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::SqliteRepositoryBase;
use ecorewards_domain::shared::{DomainError, TierId};
use ecorewards_domain::subscription::{SubscriptionRepository, SubscriptionTier};

#[derive(FromRow)]
struct TierRow {
    id: String,
    name: String,
    point_multiplier: f64,
    price_monthly_usd: f64,
}

impl TierRow {
    fn into_tier(self) -> SubscriptionTier {
        SubscriptionTier::restore(
            TierId::from_string(&self.id),
            self.name,
            self.point_multiplier,
            self.price_monthly_usd,
        )
    }
}

pub struct SqliteSubscriptionRepository {
    base: SqliteRepositoryBase,
}

impl SqliteSubscriptionRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl SubscriptionRepository for SqliteSubscriptionRepository {
    async fn find_by_id(&self, id: &TierId) -> Result<Option<SubscriptionTier>, DomainError> {
        let query = r#"
            SELECT id, name, point_multiplier, price_monthly_usd
            FROM subscription_plans
            WHERE id = ?1
        "#;

        let row: Option<TierRow> = self
            .base
            .fetch_optional(sqlx::query_as(query).bind(id.as_str()), "Find tier by ID")
            .await?;

        Ok(row.map(|r| r.into_tier()))
    }

    async fn find_all(&self) -> Result<Vec<SubscriptionTier>, DomainError> {
        let query = r#"
            SELECT id, name, point_multiplier, price_monthly_usd
            FROM subscription_plans
            ORDER BY price_monthly_usd ASC
        "#;

        let rows: Vec<TierRow> = self
            .base
            .fetch_all(sqlx::query_as(query), "List tiers")
            .await?;

        Ok(rows.into_iter().map(|r| r.into_tier()).collect())
    }
}
