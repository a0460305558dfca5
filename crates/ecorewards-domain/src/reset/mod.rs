mod record;
mod repository;
pub mod schedule;

#[cfg(test)]
mod schedule_test;

pub use record::MonthlyResetRecord;
pub use repository::ResetRepository;
pub use schedule::{ResetPhase, ResetProgress};
