use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{AchievementId, DomainError, UserId};

/// What aggregate an achievement threshold is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdKind {
    Points,
    Activities,
    Co2,
    Special,
}

impl ThresholdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdKind::Points => "points",
            ThresholdKind::Activities => "activities",
            ThresholdKind::Co2 => "co2",
            ThresholdKind::Special => "special",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "points" => Ok(ThresholdKind::Points),
            "activities" => Ok(ThresholdKind::Activities),
            "co2" => Ok(ThresholdKind::Co2),
            "special" => Ok(ThresholdKind::Special),
            other => Err(DomainError::Validation(format!(
                "Unknown threshold kind: {other}"
            ))),
        }
    }
}

/// Static achievement reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementDefinition {
    id: AchievementId,
    name: String,
    description: String,
    threshold_kind: ThresholdKind,
    threshold_value: f64,
}

impl AchievementDefinition {
    pub fn restore(
        id: AchievementId,
        name: String,
        description: String,
        threshold_kind: ThresholdKind,
        threshold_value: f64,
    ) -> Self {
        Self {
            id,
            name,
            description,
            threshold_kind,
            threshold_value,
        }
    }

    pub fn id(&self) -> &AchievementId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn threshold_kind(&self) -> ThresholdKind {
        self.threshold_kind
    }

    pub fn threshold_value(&self) -> f64 {
        self.threshold_value
    }
}

/// At most one unlock per (user, achievement) pair, enforced by a
/// uniqueness constraint in the store rather than by convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementUnlock {
    user_id: UserId,
    achievement_id: AchievementId,
    unlocked_at: DateTime<Utc>,
}

impl AchievementUnlock {
    pub fn new(user_id: UserId, achievement_id: AchievementId) -> Self {
        Self {
            user_id,
            achievement_id,
            unlocked_at: Utc::now(),
        }
    }

    pub fn restore(
        user_id: UserId,
        achievement_id: AchievementId,
        unlocked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            achievement_id,
            unlocked_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn achievement_id(&self) -> &AchievementId {
        &self.achievement_id
    }

    pub fn unlocked_at(&self) -> DateTime<Utc> {
        self.unlocked_at
    }
}
