use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivityType, PointsDomainService};
use crate::shared::{ActivityEventId, ActivityTypeId, DomainError, SharingEventId, UserId};

/// Social platforms sharing points can be earned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharingPlatform {
    Twitter,
    Facebook,
    Instagram,
    Tiktok,
    Whatsapp,
    Linkedin,
}

impl SharingPlatform {
    pub const ALL: [SharingPlatform; 6] = [
        SharingPlatform::Twitter,
        SharingPlatform::Facebook,
        SharingPlatform::Instagram,
        SharingPlatform::Tiktok,
        SharingPlatform::Whatsapp,
        SharingPlatform::Linkedin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SharingPlatform::Twitter => "twitter",
            SharingPlatform::Facebook => "facebook",
            SharingPlatform::Instagram => "instagram",
            SharingPlatform::Tiktok => "tiktok",
            SharingPlatform::Whatsapp => "whatsapp",
            SharingPlatform::Linkedin => "linkedin",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("Unknown sharing platform: {s}")))
    }
}

impl std::fmt::Display for SharingPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged eco-activity. Append-only: never mutated or deleted.
///
/// `tier_points` is a snapshot of what the user's tier earned at logging
/// time; later tier changes never touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    id: ActivityEventId,
    user_id: UserId,
    activity_type_id: ActivityTypeId,
    quantity: f64,
    base_points: f64,
    tier_points: i64,
    co2_saved: f64,
    verified: bool,
    photo_ref: Option<String>,
    geo_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl ActivityEvent {
    /// Record a new activity against a type and the current tier
    /// multiplier. Quantity is validated before anything else happens.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        user_id: UserId,
        activity_type: &ActivityType,
        quantity: f64,
        tier_multiplier: f64,
        verified: bool,
        photo_ref: Option<String>,
        geo_ref: Option<String>,
    ) -> Result<Self, DomainError> {
        PointsDomainService::validate_quantity(quantity)?;

        let base_points = PointsDomainService::base_points(quantity, activity_type.points_per_unit());
        let tier_points = PointsDomainService::tier_points(base_points, tier_multiplier);
        let co2_saved = PointsDomainService::co2_saved(quantity, activity_type.co2_per_unit());

        Ok(Self {
            id: ActivityEventId::new(),
            user_id,
            activity_type_id: activity_type.id().clone(),
            quantity,
            base_points,
            tier_points,
            co2_saved,
            verified,
            photo_ref,
            geo_ref,
            created_at: Utc::now(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ActivityEventId,
        user_id: UserId,
        activity_type_id: ActivityTypeId,
        quantity: f64,
        base_points: f64,
        tier_points: i64,
        co2_saved: f64,
        verified: bool,
        photo_ref: Option<String>,
        geo_ref: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            activity_type_id,
            quantity,
            base_points,
            tier_points,
            co2_saved,
            verified,
            photo_ref,
            geo_ref,
            created_at,
        }
    }

    pub fn id(&self) -> &ActivityEventId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn activity_type_id(&self) -> &ActivityTypeId {
        &self.activity_type_id
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn base_points(&self) -> f64 {
        self.base_points
    }

    pub fn tier_points(&self) -> i64 {
        self.tier_points
    }

    pub fn co2_saved(&self) -> f64 {
        self.co2_saved
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn photo_ref(&self) -> Option<&str> {
        self.photo_ref.as_deref()
    }

    pub fn geo_ref(&self) -> Option<&str> {
        self.geo_ref.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// One app-share. Always worth exactly one point, on any tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharingEvent {
    id: SharingEventId,
    user_id: UserId,
    platform: SharingPlatform,
    content_type: String,
    points_awarded: i64,
    created_at: DateTime<Utc>,
}

impl SharingEvent {
    pub fn record(user_id: UserId, platform: SharingPlatform, content_type: String) -> Self {
        Self {
            id: SharingEventId::new(),
            user_id,
            platform,
            content_type,
            points_awarded: PointsDomainService::SHARING_POINTS,
            created_at: Utc::now(),
        }
    }

    pub fn restore(
        id: SharingEventId,
        user_id: UserId,
        platform: SharingPlatform,
        content_type: String,
        points_awarded: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            platform,
            content_type,
            points_awarded,
            created_at,
        }
    }

    pub fn id(&self) -> &SharingEventId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn platform(&self) -> SharingPlatform {
        self.platform
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn points_awarded(&self) -> i64 {
        self.points_awarded
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
