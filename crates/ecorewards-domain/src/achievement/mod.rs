mod definition;
mod domain_service;
mod repository;

pub use definition::{AchievementDefinition, AchievementUnlock, ThresholdKind};
pub use domain_service::AchievementDomainService;
pub use repository::AchievementRepository;
