// Application layer - the rewards accounting and draw-entry engine.
// Wires domain traits together; collaborators receive structured DTOs
// only, never display strings.

pub mod bootstrap;
pub mod dtos;
pub mod queries;
pub mod services;

pub use bootstrap::RewardsRuntime;
pub use services::{
    AchievementEvaluator, DrawEntryAllocator, MonthlyResetScheduler, PointsEngine, PriceFeedCache,
};
