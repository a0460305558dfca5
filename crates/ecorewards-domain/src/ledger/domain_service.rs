use chrono::NaiveDate;

use crate::shared::DomainError;

/// Pure points arithmetic. No infrastructure dependencies.
pub struct PointsDomainService;

impl PointsDomainService {
    /// Every sharing event credits exactly this many points, on any tier.
    pub const SHARING_POINTS: i64 = 1;

    pub fn validate_quantity(quantity: f64) -> Result<(), DomainError> {
        if !quantity.is_finite() {
            return Err(DomainError::Validation(
                "Quantity must be a finite number".to_string(),
            ));
        }
        if quantity <= 0.0 {
            return Err(DomainError::Validation(format!(
                "Quantity must be positive, got {quantity}"
            )));
        }
        Ok(())
    }

    pub fn base_points(quantity: f64, points_per_unit: f64) -> f64 {
        quantity * points_per_unit
    }

    /// Tier-adjusted points: round(base x multiplier). Multiplier 0 (free
    /// tier) always yields 0.
    pub fn tier_points(base_points: f64, multiplier: f64) -> i64 {
        (base_points * multiplier).round() as i64
    }

    /// CO2 credit is never scaled by tier.
    pub fn co2_saved(quantity: f64, co2_per_unit: f64) -> f64 {
        quantity * co2_per_unit
    }

    /// Consecutive activity days ending today: day N back must have an
    /// activity exactly N days before `today`.
    ///
    /// `activity_days` may contain duplicates and be in any order.
    pub fn current_streak(activity_days: &[NaiveDate], today: NaiveDate) -> i64 {
        let mut days: Vec<NaiveDate> = activity_days.to_vec();
        days.sort_unstable();
        days.dedup();
        days.reverse();

        let mut streak = 0i64;
        for (i, day) in days.iter().enumerate() {
            let expected = today - chrono::Duration::days(i as i64);
            if *day == expected {
                streak += 1;
            } else {
                break;
            }
        }
        streak
    }
}
