mod achievement_repo;
mod activity_type_repo;
mod draw_entry_repo;
mod ledger_repo;
mod reset_repo;
mod subscription_repo;
mod user_repo;

pub use achievement_repo::SqliteAchievementRepository;
pub use activity_type_repo::SqliteActivityTypeRepository;
pub use draw_entry_repo::SqliteDrawEntryRepository;
pub use ledger_repo::SqliteLedgerRepository;
pub use reset_repo::SqliteResetRepository;
pub use subscription_repo::SqliteSubscriptionRepository;
pub use user_repo::SqliteUserRepository;
