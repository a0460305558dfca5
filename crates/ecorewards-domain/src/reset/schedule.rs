use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-user reset lifecycle. A period is ACTIVE until its due date passes;
/// a due reset moves through IN_PROGRESS (the conditional claim) back to a
/// fresh ACTIVE period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetPhase {
    ActivePeriod,
    ResetDue,
    ResetInProgress,
}

impl ResetPhase {
    pub fn classify(now: DateTime<Utc>, due: DateTime<Utc>) -> Self {
        if now >= due {
            ResetPhase::ResetDue
        } else {
            ResetPhase::ActivePeriod
        }
    }
}

/// How far through the calendar month the clock is, for countdown displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetProgress {
    pub progress_percent: f64,
    pub current_day: u32,
    pub total_days: u32,
    pub days_remaining: u32,
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // First of next month minus one day is always valid.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Advance a reset date by one calendar month, re-anchored to the signup
/// day-of-month and clamped to the last valid day of shorter months.
///
/// Re-anchoring matters: Jan 31 -> Feb 28 -> Mar 31, not Mar 28.
pub fn advance_one_month(from: DateTime<Utc>, anchor_day: u32) -> DateTime<Utc> {
    let (year, month) = if from.month() == 12 {
        (from.year() + 1, 1)
    } else {
        (from.year(), from.month() + 1)
    };

    let day = anchor_day.clamp(1, days_in_month(year, month));

    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| d.and_time(from.time()).and_utc())
        // Unreachable with a clamped day; keep the original date over panicking.
        .unwrap_or(from)
}

/// Whole days until the due date, rounded up, never negative.
pub fn days_until(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    let seconds = (due - now).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    (seconds + 86_399) / 86_400
}

pub fn reset_progress(now: DateTime<Utc>) -> ResetProgress {
    let total_days = days_in_month(now.year(), now.month());
    let current_day = now.day();
    let progress = (current_day as f64 / total_days as f64) * 100.0;

    ResetProgress {
        progress_percent: progress.clamp(0.0, 100.0),
        current_day,
        total_days,
        days_remaining: total_days - current_day,
    }
}
