//! Check-in use-case service.
//!
//! # Responsibility
//! - Turn a morning list of priority texts into categorized priorities and
//!   one check-in record.
//! - Hydrate check-ins with their priorities for today's views.
//! - Serve the personal and team statistics views.
//!
//! # Invariants
//! - Check-ins are dated to the UTC start of the current day.
//! - Hydration silently drops priority ids that no longer resolve.
//! - Task completion and deferral delegate to the priority store.

use crate::clock::{start_of_day_ms, Clock, SystemClock, WeekRange};
use crate::model::check_in::{CheckIn, CheckInId, CheckInWithPriorities, NewCheckIn};
use crate::model::priority::{NewPriority, Priority, PriorityId};
use crate::model::user::{User, UserId};
use crate::repo::check_in_repo::CheckInRepository;
use crate::repo::priority_repo::PriorityRepository;
use crate::repo::{RepoError, RepoResult};
use crate::service::priority_service::PriorityService;
use crate::stats::{self, UserStats, UserWeeklySummary, WeeklyBucket, WeeklySummary};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// One row of the team weekly leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberSummary {
    pub user: User,
    pub summary: UserWeeklySummary,
}

/// Check-in store facade.
pub struct CheckInService<CR, PR, C = SystemClock> {
    check_ins: CR,
    priorities: PriorityService<PR, C>,
}

impl<CR: CheckInRepository, PR: PriorityRepository> CheckInService<CR, PR> {
    /// Creates a service reading time from the wall clock.
    pub fn new(check_ins: CR, priorities: PR) -> Self {
        Self::with_clock(check_ins, priorities, SystemClock)
    }
}

impl<CR: CheckInRepository, PR: PriorityRepository, C: Clock> CheckInService<CR, PR, C> {
    /// Creates a service reading time from `clock`.
    pub fn with_clock(check_ins: CR, priorities: PR, clock: C) -> Self {
        Self {
            check_ins,
            priorities: PriorityService::with_clock(priorities, clock),
        }
    }

    /// The priority store this service delegates to.
    pub fn priorities(&self) -> &PriorityService<PR, C> {
        &self.priorities
    }

    /// Creates today's check-in for `user_id` from raw priority texts.
    ///
    /// Texts are trimmed and blank entries dropped; each remaining text
    /// becomes a priority categorized by keyword.
    ///
    /// # Errors
    /// - `InvalidArgument` when no non-blank text remains.
    /// - `NotFound` for an unknown user.
    /// - `DuplicateCheckIn` when the user already checked in today.
    pub fn create_check_in<S: AsRef<str>>(
        &self,
        user_id: UserId,
        texts: &[S],
    ) -> RepoResult<CheckIn> {
        let priorities = texts
            .iter()
            .map(|text| text.as_ref().trim())
            .filter(|text| !text.is_empty())
            .map(|text| NewPriority::categorized(user_id, text))
            .collect::<Vec<_>>();
        if priorities.is_empty() {
            return Err(RepoError::InvalidArgument(
                "a check-in needs at least one priority".to_string(),
            ));
        }

        let now = self.clock().now();
        let check_in = self.check_ins.create_check_in(&NewCheckIn {
            user_id,
            day: start_of_day_ms(now),
            submitted_at: now.timestamp_millis(),
            priorities,
        })?;
        info!(
            "event=check_in_create module=check_in status=ok user_id={} check_in_id={} priorities={}",
            user_id,
            check_in.id,
            check_in.priority_ids.len()
        );
        Ok(check_in)
    }

    /// Parses multi-line form input and creates today's check-in from it.
    pub fn create_check_in_from_text(&self, user_id: UserId, text: &str) -> RepoResult<CheckIn> {
        self.create_check_in(user_id, &parse_priority_list(text))
    }

    /// Gets one check-in with its priorities resolved.
    pub fn get_check_in(&self, id: CheckInId) -> RepoResult<CheckInWithPriorities> {
        let check_in = self.check_ins.get_check_in(id)?;
        self.hydrate(check_in)
    }

    /// Today's check-in for `user_id`, or `None` when there is none.
    pub fn get_todays_check_in(&self, user_id: UserId) -> RepoResult<Option<CheckInWithPriorities>> {
        let today = start_of_day_ms(self.clock().now());
        self.check_ins
            .find_check_in(user_id, today)?
            .map(|check_in| self.hydrate(check_in))
            .transpose()
    }

    /// Every user's check-in dated today.
    pub fn get_todays_check_ins(&self) -> RepoResult<Vec<CheckInWithPriorities>> {
        let today = start_of_day_ms(self.clock().now());
        self.check_ins
            .list_check_ins_for_day(today)?
            .into_iter()
            .map(|check_in| self.hydrate(check_in))
            .collect()
    }

    /// Lists all check-ins ordered by id, without hydration.
    pub fn list_check_ins(&self) -> RepoResult<Vec<CheckIn>> {
        self.check_ins.list_check_ins()
    }

    /// Removes a check-in; its priorities stay in the priority store.
    pub fn delete_check_in(&self, id: CheckInId) -> RepoResult<CheckIn> {
        let removed = self.check_ins.delete_check_in(id)?;
        info!("event=check_in_delete module=check_in status=ok check_in_id={id}");
        Ok(removed)
    }

    /// Marks a priority completed now.
    pub fn complete_task(&self, id: PriorityId) -> RepoResult<Priority> {
        self.priorities.complete(id)
    }

    /// Defers a priority to `deferred_to` (epoch ms).
    pub fn defer_task(&self, id: PriorityId, deferred_to: i64) -> RepoResult<Priority> {
        self.priorities.defer(id, deferred_to)
    }

    /// Quick defer: tomorrow (`1`), in two days (`2`), next week (`7`).
    pub fn defer_task_by_days(&self, id: PriorityId, days: u32) -> RepoResult<Priority> {
        self.priorities.defer_by_days(id, days)
    }

    /// Personal stats panel for the current week.
    pub fn get_user_stats(&self, user_id: UserId) -> RepoResult<UserStats> {
        let priorities = self.priorities.list_for_user(user_id)?;
        Ok(stats::user_stats(&priorities, self.current_week()))
    }

    /// Four weekly buckets ending with the current week, oldest first.
    pub fn get_weekly_stats(&self, user_id: UserId) -> RepoResult<Vec<WeeklyBucket>> {
        let priorities = self.priorities.list_for_user(user_id)?;
        Ok(stats::weekly_buckets(&priorities, self.current_week()))
    }

    /// Fixed team summary for the weekly page.
    pub fn get_weekly_summary(&self) -> WeeklySummary {
        stats::demo_weekly_summary()
    }

    /// Current-week totals for one user.
    pub fn get_user_weekly_summary(&self, user_id: UserId) -> RepoResult<UserWeeklySummary> {
        let priorities = self.priorities.list_for_user(user_id)?;
        Ok(stats::user_weekly_summary(
            user_id,
            &priorities,
            self.current_week(),
        ))
    }

    /// Weekly summaries for `users`, best completion rate first.
    ///
    /// Ties are ordered by ascending user id.
    pub fn team_weekly_summaries(&self, users: &[User]) -> RepoResult<Vec<TeamMemberSummary>> {
        let mut rows = users
            .iter()
            .map(|user| -> RepoResult<TeamMemberSummary> {
                Ok(TeamMemberSummary {
                    user: user.clone(),
                    summary: self.get_user_weekly_summary(user.id)?,
                })
            })
            .collect::<RepoResult<Vec<_>>>()?;
        rows.sort_by(|a, b| {
            b.summary
                .completion_rate
                .cmp(&a.summary.completion_rate)
                .then(a.user.id.cmp(&b.user.id))
        });
        Ok(rows)
    }

    fn hydrate(&self, check_in: CheckIn) -> RepoResult<CheckInWithPriorities> {
        let mut priorities = Vec::with_capacity(check_in.priority_ids.len());
        for id in &check_in.priority_ids {
            if let Some(priority) = self.priorities.find_priority(*id)? {
                priorities.push(priority);
            }
        }

        let missing = check_in.priority_ids.len() - priorities.len();
        if missing > 0 {
            warn!(
                "event=check_in_hydrate module=check_in status=partial check_in_id={} missing={}",
                check_in.id, missing
            );
        }
        Ok(CheckInWithPriorities::hydrate(check_in, priorities))
    }

    fn current_week(&self) -> WeekRange {
        WeekRange::containing(self.clock().now())
    }

    fn clock(&self) -> &C {
        self.priorities.clock()
    }
}

/// Splits multi-line input into priority texts: one per non-blank line,
/// trimmed, in input order.
pub fn parse_priority_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
