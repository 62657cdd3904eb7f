//! Daily check-in model.
//!
//! # Invariants
//! - `day` is the UTC start-of-day timestamp of the check-in date.
//! - At most one check-in exists per `(user_id, day)`.
//! - `priority_ids` keeps submission order.

use crate::model::priority::{NewPriority, Priority, PriorityId};
use crate::model::user::UserId;
use crate::stats::completion_rate;
use serde::{Deserialize, Serialize};

pub type CheckInId = i64;

/// Stored check-in record referencing priorities by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: CheckInId,
    pub user_id: UserId,
    /// UTC start of day, epoch milliseconds.
    pub day: i64,
    pub priority_ids: Vec<PriorityId>,
    /// Epoch milliseconds.
    pub submitted_at: i64,
}

/// Write model for a check-in together with the priorities it creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckIn {
    pub user_id: UserId,
    pub day: i64,
    pub submitted_at: i64,
    pub priorities: Vec<NewPriority>,
}

/// Check-in with referenced priorities resolved.
///
/// Priorities that no longer exist are dropped during hydration, so
/// `priorities.len()` may be smaller than the stored id list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInWithPriorities {
    pub id: CheckInId,
    pub user_id: UserId,
    pub day: i64,
    pub priorities: Vec<Priority>,
    pub submitted_at: i64,
}

impl CheckInWithPriorities {
    pub fn hydrate(check_in: CheckIn, priorities: Vec<Priority>) -> Self {
        Self {
            id: check_in.id,
            user_id: check_in.user_id,
            day: check_in.day,
            priorities,
            submitted_at: check_in.submitted_at,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.priorities
            .iter()
            .filter(|priority| priority.is_completed())
            .count()
    }

    /// Rounded completion percentage; 0 for an empty check-in.
    pub fn completion_rate(&self) -> u32 {
        completion_rate(self.completed_count(), self.priorities.len())
    }
}
