//! Aggregate statistics over a user's priority history.
//!
//! # Responsibility
//! - Derive weekly completion rates, completed totals and most-deferred lists.
//! - Stay storage-agnostic: every function works on slices of `Priority`.
//!
//! # Invariants
//! - Rates are rounded percentages in `0..=100`; an empty period yields 0.
//! - Weekly buckets are returned oldest first.
//!
//! The streak value is a placeholder. It is random in `1..=7` and is not
//! derived from check-in history.

use crate::clock::WeekRange;
use crate::model::priority::Priority;
use crate::model::user::UserId;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of weekly buckets reported by `weekly_buckets`.
pub const WEEKLY_HISTORY_WEEKS: u32 = 4;
/// Maximum entries in `UserStats::most_deferred_tasks`.
pub const MOST_DEFERRED_LIMIT: usize = 3;
/// Priorities deferred more than this many times are "most deferred".
pub const MOST_DEFERRED_MIN_COUNT: u32 = 2;

/// Personal progress panel data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub this_week_completion_rate: u32,
    /// Placeholder; see module docs.
    pub current_streak: u32,
    pub total_completed_tasks: usize,
    pub most_deferred_tasks: Vec<Priority>,
}

/// Totals for one calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    /// Monday 00:00 UTC, epoch milliseconds.
    pub week_start: i64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: u32,
}

/// Team-wide summary for the current week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub completion_rate: u32,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub deferred_tasks: usize,
    pub common_focus: Vec<String>,
}

/// Per-user summary for the current week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWeeklySummary {
    pub user_id: UserId,
    pub completion_rate: u32,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Placeholder; see module docs.
    pub streak: u32,
}

/// Rounded percentage of `completed` over `total`, half rounding up.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((completed * 200 + total) / (total * 2)) as u32
}

/// Counts `(total, completed)` among priorities created inside `week`.
pub fn week_totals(priorities: &[Priority], week: WeekRange) -> (usize, usize) {
    priorities
        .iter()
        .filter(|priority| priority.created_within(week.start_ms, week.end_ms))
        .fold((0, 0), |(total, completed), priority| {
            (total + 1, completed + usize::from(priority.is_completed()))
        })
}

pub fn total_completed(priorities: &[Priority]) -> usize {
    priorities
        .iter()
        .filter(|priority| priority.is_completed())
        .count()
}

/// Top priorities by defer count, restricted to counts above the threshold.
///
/// Ties keep ascending id order.
pub fn most_deferred(priorities: &[Priority]) -> Vec<Priority> {
    let mut deferred = priorities
        .iter()
        .filter(|priority| priority.defer_count > MOST_DEFERRED_MIN_COUNT)
        .cloned()
        .collect::<Vec<_>>();
    deferred.sort_by(|a, b| b.defer_count.cmp(&a.defer_count).then(a.id.cmp(&b.id)));
    deferred.truncate(MOST_DEFERRED_LIMIT);
    deferred
}

/// Builds the personal stats panel for `current_week`.
pub fn user_stats(priorities: &[Priority], current_week: WeekRange) -> UserStats {
    let (total, completed) = week_totals(priorities, current_week);
    UserStats {
        this_week_completion_rate: completion_rate(completed, total),
        current_streak: placeholder_streak(),
        total_completed_tasks: total_completed(priorities),
        most_deferred_tasks: most_deferred(priorities),
    }
}

/// Last `WEEKLY_HISTORY_WEEKS` weeks ending with `current_week`, oldest first.
pub fn weekly_buckets(priorities: &[Priority], current_week: WeekRange) -> Vec<WeeklyBucket> {
    (0..WEEKLY_HISTORY_WEEKS)
        .rev()
        .map(|weeks_back| {
            let week = current_week.previous(weeks_back);
            let (total, completed) = week_totals(priorities, week);
            WeeklyBucket {
                week_start: week.start_ms,
                total_tasks: total,
                completed_tasks: completed,
                completion_rate: completion_rate(completed, total),
            }
        })
        .collect()
}

pub fn user_weekly_summary(
    user_id: UserId,
    priorities: &[Priority],
    current_week: WeekRange,
) -> UserWeeklySummary {
    let (total, completed) = week_totals(priorities, current_week);
    UserWeeklySummary {
        user_id,
        completion_rate: completion_rate(completed, total),
        total_tasks: total,
        completed_tasks: completed,
        streak: placeholder_streak(),
    }
}

/// Fixed team summary shown on the weekly page.
///
/// These values are not computed from stored priorities; per-user figures
/// come from `user_weekly_summary`.
pub fn demo_weekly_summary() -> WeeklySummary {
    WeeklySummary {
        completion_rate: 75,
        total_tasks: 20,
        completed_tasks: 15,
        deferred_tasks: 3,
        common_focus: vec![
            "Development".to_string(),
            "Meetings".to_string(),
            "Planning".to_string(),
        ],
    }
}

/// Random streak in `1..=7`.
pub fn placeholder_streak() -> u32 {
    rand::rng().random_range(1..=7)
}

#[cfg(test)]
mod tests {
    use super::{completion_rate, most_deferred, placeholder_streak, week_totals};
    use crate::clock::WeekRange;
    use crate::model::priority::Priority;

    fn priority(id: i64, created_at: i64, completed: bool, defer_count: u32) -> Priority {
        Priority {
            id,
            user_id: 1,
            text: format!("task {id}"),
            category: None,
            created_at,
            completed_at: completed.then_some(created_at + 1),
            deferred_to: None,
            defer_count,
        }
    }

    #[test]
    fn completion_rate_handles_empty_and_rounding() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(1, 8), 13);
        assert_eq!(completion_rate(4, 4), 100);
    }

    #[test]
    fn week_totals_counts_only_inside_range() {
        let week = WeekRange {
            start_ms: 100,
            end_ms: 200,
        };
        let priorities = vec![
            priority(1, 99, true, 0),
            priority(2, 100, true, 0),
            priority(3, 200, false, 0),
            priority(4, 201, true, 0),
        ];
        assert_eq!(week_totals(&priorities, week), (2, 1));
    }

    #[test]
    fn most_deferred_filters_sorts_and_truncates() {
        let priorities = vec![
            priority(1, 0, false, 2),
            priority(2, 0, false, 3),
            priority(3, 0, false, 6),
            priority(4, 0, false, 4),
            priority(5, 0, false, 3),
        ];
        let ids = most_deferred(&priorities)
            .iter()
            .map(|priority| priority.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![3, 4, 2]);
    }

    #[test]
    fn placeholder_streak_stays_in_range() {
        for _ in 0..64 {
            let streak = placeholder_streak();
            assert!((1..=7).contains(&streak));
        }
    }
}
