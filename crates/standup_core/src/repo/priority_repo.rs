//! Priority store contracts and SQLite implementation.
//!
//! # Invariants
//! - New ids are strictly greater than every id previously assigned, even
//!   after deletes (`AUTOINCREMENT`).
//! - New priorities start with no completion, no deferral and
//!   `defer_count = 0`.
//! - Each defer increments `defer_count` by exactly one; updates never
//!   write it.

use crate::db::migrations::ensure_latest;
use crate::model::category::Category;
use crate::model::priority::{NewPriority, Priority, PriorityId, PriorityPatch};
use crate::model::user::UserId;
use crate::repo::{EntityRef, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const PRIORITY_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    text,
    category,
    created_at,
    completed_at,
    deferred_to,
    defer_count
FROM priorities";

/// Repository interface for priority operations.
pub trait PriorityRepository {
    /// Lists all priorities ordered by id.
    fn list_priorities(&self) -> RepoResult<Vec<Priority>>;
    fn get_priority(&self, id: PriorityId) -> RepoResult<Priority>;
    fn find_priority(&self, id: PriorityId) -> RepoResult<Option<Priority>>;
    /// Lists one user's priorities ordered by id.
    fn list_priorities_for_user(&self, user_id: UserId) -> RepoResult<Vec<Priority>>;
    /// Inserts a priority; `created_at` falls back to `default_created_at`.
    fn create_priority(
        &self,
        priority: &NewPriority,
        default_created_at: i64,
    ) -> RepoResult<Priority>;
    fn update_priority(&self, id: PriorityId, patch: &PriorityPatch) -> RepoResult<Priority>;
    /// Sets the completion timestamp, overwriting any previous one.
    fn mark_completed(&self, id: PriorityId, completed_at: i64) -> RepoResult<Priority>;
    /// Sets `deferred_to` and increments `defer_count`.
    fn mark_deferred(&self, id: PriorityId, deferred_to: i64) -> RepoResult<Priority>;
    /// Removes the priority and returns the removed record.
    fn delete_priority(&self, id: PriorityId) -> RepoResult<Priority>;
}

/// SQLite-backed priority repository.
pub struct SqlitePriorityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePriorityRepository<'conn> {
    /// Binds the repository to a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_latest(conn)?;
        Ok(Self { conn })
    }

    fn query_priorities(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Priority>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut priorities = Vec::new();
        while let Some(row) = rows.next()? {
            priorities.push(parse_priority_row(row)?);
        }
        Ok(priorities)
    }
}

impl PriorityRepository for SqlitePriorityRepository<'_> {
    fn list_priorities(&self) -> RepoResult<Vec<Priority>> {
        self.query_priorities(&format!("{PRIORITY_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn get_priority(&self, id: PriorityId) -> RepoResult<Priority> {
        self.find_priority(id)?
            .ok_or(RepoError::NotFound(EntityRef::Priority(id)))
    }

    fn find_priority(&self, id: PriorityId) -> RepoResult<Option<Priority>> {
        select_priority(self.conn, id)
    }

    fn list_priorities_for_user(&self, user_id: UserId) -> RepoResult<Vec<Priority>> {
        self.query_priorities(
            &format!("{PRIORITY_SELECT_SQL} WHERE user_id = ?1 ORDER BY id ASC;"),
            [user_id],
        )
    }

    fn create_priority(
        &self,
        priority: &NewPriority,
        default_created_at: i64,
    ) -> RepoResult<Priority> {
        insert_priority(self.conn, priority, default_created_at)
    }

    fn update_priority(&self, id: PriorityId, patch: &PriorityPatch) -> RepoResult<Priority> {
        let mut priority = self.get_priority(id)?;
        priority.apply(patch);

        self.conn.execute(
            "UPDATE priorities
             SET
                text = ?1,
                category = ?2,
                completed_at = ?3,
                deferred_to = ?4
             WHERE id = ?5;",
            params![
                priority.text.as_str(),
                priority.category.map(Category::label),
                priority.completed_at,
                priority.deferred_to,
                id,
            ],
        )?;

        Ok(priority)
    }

    fn mark_completed(&self, id: PriorityId, completed_at: i64) -> RepoResult<Priority> {
        let changed = self.conn.execute(
            "UPDATE priorities SET completed_at = ?1 WHERE id = ?2;",
            params![completed_at, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Priority(id)));
        }
        self.get_priority(id)
    }

    fn mark_deferred(&self, id: PriorityId, deferred_to: i64) -> RepoResult<Priority> {
        let changed = self.conn.execute(
            "UPDATE priorities
             SET
                deferred_to = ?1,
                defer_count = defer_count + 1
             WHERE id = ?2;",
            params![deferred_to, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Priority(id)));
        }
        self.get_priority(id)
    }

    fn delete_priority(&self, id: PriorityId) -> RepoResult<Priority> {
        let priority = self.get_priority(id)?;
        self.conn
            .execute("DELETE FROM priorities WHERE id = ?1;", [id])?;
        Ok(priority)
    }
}

/// Inserts one priority on `conn`, which may be an open transaction.
pub(crate) fn insert_priority(
    conn: &Connection,
    priority: &NewPriority,
    default_created_at: i64,
) -> RepoResult<Priority> {
    conn.execute(
        "INSERT INTO priorities (user_id, text, category, created_at, defer_count)
         VALUES (?1, ?2, ?3, ?4, 0);",
        params![
            priority.user_id,
            priority.text.as_str(),
            priority.category.map(Category::label),
            priority.created_at.unwrap_or(default_created_at),
        ],
    )?;

    let id = conn.last_insert_rowid();
    select_priority(conn, id)?.ok_or(RepoError::InvalidData(format!(
        "priority {id} missing after insert"
    )))
}

fn select_priority(conn: &Connection, id: PriorityId) -> RepoResult<Option<Priority>> {
    let mut stmt = conn.prepare(&format!("{PRIORITY_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_priority_row(row)?));
    }
    Ok(None)
}

fn parse_priority_row(row: &Row<'_>) -> RepoResult<Priority> {
    let category = match row.get::<_, Option<String>>("category")? {
        Some(label) => Some(Category::from_label(&label).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid category `{label}` in priorities.category"))
        })?),
        None => None,
    };

    Ok(Priority {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        text: row.get("text")?,
        category,
        created_at: row.get("created_at")?,
        completed_at: row.get("completed_at")?,
        deferred_to: row.get("deferred_to")?,
        defer_count: row.get("defer_count")?,
    })
}
