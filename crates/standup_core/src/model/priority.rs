//! Priority (daily task) model.
//!
//! # Invariants
//! - `defer_count` only grows through defer operations.
//! - Completion and deferral are independent: a deferred priority may later
//!   be completed.

use crate::model::category::Category;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

pub type PriorityId = i64;

/// One task a user committed to during a check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub id: PriorityId,
    pub user_id: UserId,
    /// Free-text description as typed by the user.
    pub text: String,
    /// Derived from `text` at check-in time; absent for direct creates.
    pub category: Option<Category>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, set on completion.
    pub completed_at: Option<i64>,
    /// Start of the day the priority was pushed to (epoch ms).
    pub deferred_to: Option<i64>,
    pub defer_count: u32,
}

impl Priority {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred_to.is_some()
    }

    /// Whether `created_at` falls inside `[start_ms, end_ms]`.
    pub fn created_within(&self, start_ms: i64, end_ms: i64) -> bool {
        self.created_at >= start_ms && self.created_at <= end_ms
    }

    /// Merges a partial update into this record.
    pub fn apply(&mut self, patch: &PriorityPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(deferred_to) = patch.deferred_to {
            self.deferred_to = deferred_to;
        }
    }
}

/// Caller-supplied fields for priority creation.
///
/// Completion/defer state always starts empty; `created_at` defaults to the
/// store clock when not supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPriority {
    pub user_id: UserId,
    pub text: String,
    pub category: Option<Category>,
    pub created_at: Option<i64>,
}

impl NewPriority {
    pub fn new(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            text: text.into(),
            category: None,
            created_at: None,
        }
    }

    /// Builds a priority with its category derived from the text.
    pub fn categorized(user_id: UserId, text: impl Into<String>) -> Self {
        let text = text.into();
        let category = Category::classify(&text);
        Self {
            user_id,
            text,
            category: Some(category),
            created_at: None,
        }
    }
}

/// Partial update for a priority. Nested `Option`s allow clearing nullable
/// fields (`Some(None)`).
///
/// There is no `defer_count` field; only defer operations change it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityPatch {
    pub text: Option<String>,
    pub category: Option<Option<Category>>,
    pub completed_at: Option<Option<i64>>,
    pub deferred_to: Option<Option<i64>>,
}
