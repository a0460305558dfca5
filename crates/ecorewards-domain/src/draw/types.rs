use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{DrawId, UserId};

/// Prize draw cadence/prize pairing, as scheduled by the draw backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawKind {
    WeeklyBitcoin,
    MonthlyEthereum,
    Mega,
}

impl DrawKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawKind::WeeklyBitcoin => "weekly_bitcoin",
            DrawKind::MonthlyEthereum => "monthly_ethereum",
            DrawKind::Mega => "mega",
        }
    }
}

/// An open or upcoming draw as reported by the external Draw Service.
/// The winner-selection algorithm is entirely internal to that service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draw {
    pub id: DrawId,
    pub kind: DrawKind,
    pub prize_usd_amount: f64,
    pub crypto_symbol: String,
    pub close_date: DateTime<Utc>,
}

/// Per-user entry count inside one draw, from the Draw Service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawEntryCount {
    pub user_id: UserId,
    pub entry_count: i64,
    pub total_points: i64,
}

/// A past winner, for display collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub draw_id: DrawId,
    pub kind: DrawKind,
    pub user_id: UserId,
    pub prize_usd_amount: f64,
    pub crypto_symbol: String,
    pub drawn_at: DateTime<Utc>,
}
