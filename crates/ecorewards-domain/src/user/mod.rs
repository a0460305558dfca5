mod aggregate;
mod repository;
mod stats;


pub use aggregate::UserAccount;
pub use repository::{LeaderboardRow, UserRepository};
pub use stats::UserStats;
