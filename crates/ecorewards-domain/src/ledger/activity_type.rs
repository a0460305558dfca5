use serde::{Deserialize, Serialize};

use crate::shared::ActivityTypeId;

/// Reference data for a loggable eco-activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityType {
    id: ActivityTypeId,
    name: String,
    unit: String,
    points_per_unit: f64,
    co2_per_unit: f64,
}

impl ActivityType {
    pub fn restore(
        id: ActivityTypeId,
        name: String,
        unit: String,
        points_per_unit: f64,
        co2_per_unit: f64,
    ) -> Self {
        Self {
            id,
            name,
            unit,
            points_per_unit,
            co2_per_unit,
        }
    }

    pub fn id(&self) -> &ActivityTypeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn points_per_unit(&self) -> f64 {
        self.points_per_unit
    }

    pub fn co2_per_unit(&self) -> f64 {
        self.co2_per_unit
    }
}
