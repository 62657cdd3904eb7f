//! User use-case service.
//!
//! # Invariants
//! - The numeric id is canonical; string input is resolved to it first.
//! - The demo "current user" is the user with the lowest id.

use crate::clock::{Clock, SystemClock};
use crate::model::user::{NewUser, User, UserId, UserPatch};
use crate::repo::user_repo::UserRepository;
use crate::repo::{EntityRef, RepoError, RepoResult};
use log::info;

/// User store facade over repository implementations.
pub struct UserService<R, C = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service reading time from the wall clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: UserRepository, C: Clock> UserService<R, C> {
    /// Creates a service reading time from `clock`.
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Lists all users ordered by id.
    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.repo.list_users()
    }

    /// Gets one user by numeric id.
    pub fn get_user(&self, id: UserId) -> RepoResult<User> {
        self.repo.get_user(id)
    }

    /// Resolves a numeric id (`"3"`) or a legacy handle (`"user-3"`) to the
    /// canonical user id.
    ///
    /// # Errors
    /// - `InvalidArgument` for blank input or a non-positive numeric id.
    /// - `NotFound` when nothing matches.
    pub fn resolve_user(&self, reference: &str) -> RepoResult<UserId> {
        self.lookup_user(reference).map(|user| user.id)
    }

    /// Looks a user up by either identifier form.
    pub fn lookup_user(&self, reference: &str) -> RepoResult<User> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(RepoError::InvalidArgument(
                "user identifier must not be blank".to_string(),
            ));
        }

        if let Ok(id) = trimmed.parse::<UserId>() {
            if id <= 0 {
                return Err(RepoError::InvalidArgument(format!(
                    "user id must be positive, got {id}"
                )));
            }
            return self.repo.get_user(id);
        }

        self.repo
            .find_user_by_handle(trimmed)?
            .ok_or_else(|| RepoError::NotFound(EntityRef::UserHandle(trimmed.to_string())))
    }

    /// The user the single-user demo acts as; `None` for an empty store.
    pub fn current_user(&self) -> RepoResult<Option<User>> {
        Ok(self.repo.list_users()?.into_iter().next())
    }

    /// Creates a user stamped with the current time.
    pub fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        let created = self.repo.create_user(user, self.clock.now_ms())?;
        info!(
            "event=user_create module=user status=ok user_id={}",
            created.id
        );
        Ok(created)
    }

    /// Merges `patch` into an existing user.
    pub fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User> {
        self.repo.update_user(id, patch)
    }

    /// Deletes a user and returns the removed record.
    pub fn delete_user(&self, id: UserId) -> RepoResult<User> {
        let removed = self.repo.delete_user(id)?;
        info!("event=user_delete module=user status=ok user_id={id}");
        Ok(removed)
    }
}
