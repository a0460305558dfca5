mod repository;
mod tier;

pub use repository::SubscriptionRepository;
pub use tier::SubscriptionTier;
