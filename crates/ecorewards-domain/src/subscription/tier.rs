use serde::{Deserialize, Serialize};

use crate::shared::TierId;

/// Immutable subscription reference data: tier -> activity point multiplier.
///
/// The free tier has multiplier 0: no activity points at all, sharing is
/// its only point source. Multipliers never apply retroactively; each
/// activity event snapshots the tier points it was awarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionTier {
    id: TierId,
    name: String,
    point_multiplier: f64,
    price_monthly_usd: f64,
}

impl SubscriptionTier {
    pub fn restore(
        id: TierId,
        name: String,
        point_multiplier: f64,
        price_monthly_usd: f64,
    ) -> Self {
        Self {
            id,
            name,
            point_multiplier,
            price_monthly_usd,
        }
    }

    pub fn id(&self) -> &TierId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn point_multiplier(&self) -> f64 {
        self.point_multiplier
    }

    pub fn price_monthly_usd(&self) -> f64 {
        self.price_monthly_usd
    }

    pub fn is_free(&self) -> bool {
        self.point_multiplier == 0.0
    }
}
