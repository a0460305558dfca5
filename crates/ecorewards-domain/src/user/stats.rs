use serde::{Deserialize, Serialize};

/// Aggregates derived from a full ledger replay for one user.
///
/// Monthly figures cover only events at or after the current period start;
/// lifetime figures cover the whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub monthly_points: i64,
    pub lifetime_points: i64,
    pub sharing_points: i64,
    pub total_co2_saved: f64,
    pub total_activities: i64,
    pub verified_activities: i64,
    pub current_streak: i64,
}
