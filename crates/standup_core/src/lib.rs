//! Core domain logic for the team standup tracker.
//!
//! Users check in each morning with a list of priorities, complete or defer
//! them through the day, and read personal and team progress summaries.
//! This crate is the single source of truth for those rules.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;

pub use clock::{Clock, FixedClock, SystemClock, WeekRange};
pub use config::StandupConfig;
pub use db::seed::{SeedData, SeedError, SeedSource};
pub use db::{open_db_in_memory, open_seeded_db, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::Category;
pub use model::check_in::{CheckIn, CheckInId, CheckInWithPriorities, NewCheckIn};
pub use model::priority::{NewPriority, Priority, PriorityId, PriorityPatch};
pub use model::user::{NewUser, User, UserId, UserPatch};
pub use repo::check_in_repo::{CheckInRepository, SqliteCheckInRepository};
pub use repo::priority_repo::{PriorityRepository, SqlitePriorityRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{EntityRef, RepoError, RepoResult};
pub use service::check_in_service::{parse_priority_list, CheckInService, TeamMemberSummary};
pub use service::priority_service::PriorityService;
pub use service::user_service::UserService;
pub use stats::{UserStats, UserWeeklySummary, WeeklyBucket, WeeklySummary};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
