//! User profile model.
//!
//! # Invariants
//! - `id` is the canonical identifier used by every lookup.
//! - `handle` is a stable secondary key kept for legacy string references.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical numeric user identifier.
pub type UserId = i64;

/// Team member profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Legacy string identifier (`user-...`), unique per store.
    pub handle: String,
    /// Display name.
    pub name: String,
    /// Optional avatar URL or asset reference.
    pub avatar: Option<String>,
    /// Streak counter shown next to the avatar.
    pub weekly_streak: u32,
    /// Unix epoch milliseconds.
    pub joined_at: i64,
}

/// Caller-supplied fields for user creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub avatar: Option<String>,
    pub weekly_streak: u32,
    /// Overrides the generated `user-<uuid>` handle when set.
    pub handle: Option<String>,
}

impl NewUser {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the explicit handle, or a freshly generated one.
    pub fn resolve_handle(&self) -> String {
        match self.handle.as_deref().map(str::trim) {
            Some(handle) if !handle.is_empty() => handle.to_string(),
            _ => generate_handle(),
        }
    }
}

/// Partial update for a user. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    /// `Some(None)` clears the avatar.
    pub avatar: Option<Option<String>>,
    pub weekly_streak: Option<u32>,
}

impl User {
    /// Merges a partial update into this record.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(avatar) = &patch.avatar {
            self.avatar = avatar.clone();
        }
        if let Some(streak) = patch.weekly_streak {
            self.weekly_streak = streak;
        }
    }
}

fn generate_handle() -> String {
    format!("user-{}", Uuid::new_v4().simple())
}
