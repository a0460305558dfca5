mod activity_type;
mod domain_service;
mod events;
mod repository;


pub use activity_type::ActivityType;
pub use domain_service::PointsDomainService;
pub use events::{ActivityEvent, SharingEvent, SharingPlatform};
pub use repository::{ActivityTypeRepository, LedgerRepository};
