//! Priority use-case service.
//!
//! # Invariants
//! - `complete` is idempotent apart from refreshing the timestamp.
//! - `defer` never touches completion state.

use crate::clock::{start_of_day_after_ms, Clock, SystemClock};
use crate::model::priority::{NewPriority, Priority, PriorityId, PriorityPatch};
use crate::model::user::UserId;
use crate::repo::priority_repo::PriorityRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Priority store facade over repository implementations.
pub struct PriorityService<R, C = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: PriorityRepository> PriorityService<R> {
    /// Creates a service reading time from the wall clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: PriorityRepository, C: Clock> PriorityService<R, C> {
    /// Creates a service reading time from `clock`.
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Lists all priorities ordered by id.
    pub fn list_priorities(&self) -> RepoResult<Vec<Priority>> {
        self.repo.list_priorities()
    }

    /// Gets one priority by id.
    pub fn get_priority(&self, id: PriorityId) -> RepoResult<Priority> {
        self.repo.get_priority(id)
    }

    /// Like `get_priority`, but a missing id is `Ok(None)`.
    pub fn find_priority(&self, id: PriorityId) -> RepoResult<Option<Priority>> {
        self.repo.find_priority(id)
    }

    /// Lists one user's priorities ordered by id.
    pub fn list_for_user(&self, user_id: UserId) -> RepoResult<Vec<Priority>> {
        self.repo.list_priorities_for_user(user_id)
    }

    /// Creates a priority; `created_at` defaults to now.
    pub fn create_priority(&self, priority: &NewPriority) -> RepoResult<Priority> {
        self.repo.create_priority(priority, self.clock.now_ms())
    }

    /// Merges `patch` into an existing priority.
    pub fn update_priority(&self, id: PriorityId, patch: &PriorityPatch) -> RepoResult<Priority> {
        self.repo.update_priority(id, patch)
    }

    /// Marks the priority completed now.
    pub fn complete(&self, id: PriorityId) -> RepoResult<Priority> {
        let priority = self.repo.mark_completed(id, self.clock.now_ms())?;
        info!("event=priority_complete module=priority status=ok priority_id={id}");
        Ok(priority)
    }

    /// Defers the priority to `deferred_to` (epoch ms).
    pub fn defer(&self, id: PriorityId, deferred_to: i64) -> RepoResult<Priority> {
        let priority = self.repo.mark_deferred(id, deferred_to)?;
        info!(
            "event=priority_defer module=priority status=ok priority_id={} defer_count={}",
            id, priority.defer_count
        );
        Ok(priority)
    }

    /// Defers to the start of the day `days` from today.
    pub fn defer_by_days(&self, id: PriorityId, days: u32) -> RepoResult<Priority> {
        let deferred_to = start_of_day_after_ms(self.clock.now(), days).ok_or_else(|| {
            RepoError::InvalidArgument(format!("cannot defer {days} days past the calendar range"))
        })?;
        self.defer(id, deferred_to)
    }

    /// Deletes a priority and returns the removed record.
    pub fn delete_priority(&self, id: PriorityId) -> RepoResult<Priority> {
        let removed = self.repo.delete_priority(id)?;
        info!("event=priority_delete module=priority status=ok priority_id={id}");
        Ok(removed)
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }
}
