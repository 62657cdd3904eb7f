//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the data access contracts of the user, priority and check-in
//!   stores.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Repositories only accept connections carrying the latest schema.
//! - Lookups of missing rows fail with `RepoError::NotFound` carrying the
//!   requested identifier.
//! - Every returned record is an owned copy; callers never hold live rows.
//! - Repositories take timestamps from callers and never read the clock.

use crate::db::DbError;
use crate::model::check_in::CheckInId;
use crate::model::priority::PriorityId;
use crate::model::user::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod check_in_repo;
pub mod priority_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Identifier of a record that failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    User(UserId),
    UserHandle(String),
    Priority(PriorityId),
    CheckIn(CheckInId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {id}"),
            Self::UserHandle(handle) => write!(f, "user `{handle}`"),
            Self::Priority(id) => write!(f, "priority {id}"),
            Self::CheckIn(id) => write!(f, "check-in {id}"),
        }
    }
}

/// Error returned by every store operation.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(EntityRef),
    /// Caller input rejected before touching storage.
    InvalidArgument(String),
    /// The user already checked in for that day.
    DuplicateCheckIn { user_id: UserId, day: i64 },
    /// Stored row cannot be mapped back to the model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::DuplicateCheckIn { user_id, day } => {
                write!(f, "user {user_id} already checked in for day {day}")
            }
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidArgument(_)
            | Self::DuplicateCheckIn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
