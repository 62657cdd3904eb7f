//! Check-in store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist check-ins together with the priorities they create.
//! - Enforce the one-check-in-per-user-per-day rule at the store boundary.
//!
//! # Invariants
//! - `create_check_in` writes priorities, the check-in row and its ordered
//!   priority links in one transaction; on failure nothing is written.
//! - `(user_id, day)` is unique; duplicates fail with
//!   `RepoError::DuplicateCheckIn`.
//! - Deleting a check-in keeps its priorities.

use crate::db::migrations::ensure_latest;
use crate::model::check_in::{CheckIn, CheckInId, NewCheckIn};
use crate::model::priority::PriorityId;
use crate::model::user::UserId;
use crate::repo::priority_repo::insert_priority;
use crate::repo::{is_unique_violation, EntityRef, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

const CHECK_IN_SELECT_SQL: &str = "SELECT id, user_id, day, submitted_at FROM check_ins";

/// Repository interface for check-in operations.
pub trait CheckInRepository {
    fn create_check_in(&self, check_in: &NewCheckIn) -> RepoResult<CheckIn>;
    fn get_check_in(&self, id: CheckInId) -> RepoResult<CheckIn>;
    /// Lists all check-ins ordered by id.
    fn list_check_ins(&self) -> RepoResult<Vec<CheckIn>>;
    fn find_check_in(&self, user_id: UserId, day: i64) -> RepoResult<Option<CheckIn>>;
    /// Lists every user's check-in for `day`, ordered by id.
    fn list_check_ins_for_day(&self, day: i64) -> RepoResult<Vec<CheckIn>>;
    /// Removes the check-in and returns the removed record.
    fn delete_check_in(&self, id: CheckInId) -> RepoResult<CheckIn>;
}

/// SQLite-backed check-in repository.
pub struct SqliteCheckInRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCheckInRepository<'conn> {
    /// Binds the repository to a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_latest(conn)?;
        Ok(Self { conn })
    }

    fn query_check_ins(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<CheckIn>> {
        let mut stmt = self.conn.prepare(sql)?;
        let heads = stmt
            .query_map(params, |row| {
                Ok((
                    row.get::<_, CheckInId>("id")?,
                    row.get::<_, UserId>("user_id")?,
                    row.get::<_, i64>("day")?,
                    row.get::<_, i64>("submitted_at")?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        heads
            .into_iter()
            .map(|(id, user_id, day, submitted_at)| -> RepoResult<CheckIn> {
                Ok(CheckIn {
                    id,
                    user_id,
                    day,
                    priority_ids: load_priority_ids(self.conn, id)?,
                    submitted_at,
                })
            })
            .collect()
    }
}

impl CheckInRepository for SqliteCheckInRepository<'_> {
    fn create_check_in(&self, check_in: &NewCheckIn) -> RepoResult<CheckIn> {
        let tx = self.conn.unchecked_transaction()?;

        let user_exists = tx
            .query_row(
                "SELECT 1 FROM users WHERE id = ?1;",
                [check_in.user_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !user_exists {
            return Err(RepoError::NotFound(EntityRef::User(check_in.user_id)));
        }

        let duplicate = tx
            .query_row(
                "SELECT id FROM check_ins WHERE user_id = ?1 AND day = ?2;",
                params![check_in.user_id, check_in.day],
                |row| row.get::<_, CheckInId>(0),
            )
            .optional()?;
        if duplicate.is_some() {
            return Err(RepoError::DuplicateCheckIn {
                user_id: check_in.user_id,
                day: check_in.day,
            });
        }

        let mut priority_ids = Vec::with_capacity(check_in.priorities.len());
        for priority in &check_in.priorities {
            priority_ids.push(insert_priority(&tx, priority, check_in.submitted_at)?.id);
        }

        let inserted = tx.execute(
            "INSERT INTO check_ins (user_id, day, submitted_at) VALUES (?1, ?2, ?3);",
            params![check_in.user_id, check_in.day, check_in.submitted_at],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::DuplicateCheckIn {
                    user_id: check_in.user_id,
                    day: check_in.day,
                });
            }
            Err(err) => return Err(err.into()),
        }
        let id = tx.last_insert_rowid();

        for (position, priority_id) in priority_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO check_in_priorities (check_in_id, position, priority_id)
                 VALUES (?1, ?2, ?3);",
                params![id, position as i64, priority_id],
            )?;
        }
        tx.commit()?;

        Ok(CheckIn {
            id,
            user_id: check_in.user_id,
            day: check_in.day,
            priority_ids,
            submitted_at: check_in.submitted_at,
        })
    }

    fn get_check_in(&self, id: CheckInId) -> RepoResult<CheckIn> {
        self.query_check_ins(&format!("{CHECK_IN_SELECT_SQL} WHERE id = ?1;"), [id])?
            .pop()
            .ok_or(RepoError::NotFound(EntityRef::CheckIn(id)))
    }

    fn list_check_ins(&self) -> RepoResult<Vec<CheckIn>> {
        self.query_check_ins(&format!("{CHECK_IN_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn find_check_in(&self, user_id: UserId, day: i64) -> RepoResult<Option<CheckIn>> {
        let mut found = self.query_check_ins(
            &format!("{CHECK_IN_SELECT_SQL} WHERE user_id = ?1 AND day = ?2 ORDER BY id ASC;"),
            params![user_id, day],
        )?;
        if found.is_empty() {
            return Ok(None);
        }
        Ok(Some(found.swap_remove(0)))
    }

    fn list_check_ins_for_day(&self, day: i64) -> RepoResult<Vec<CheckIn>> {
        self.query_check_ins(
            &format!("{CHECK_IN_SELECT_SQL} WHERE day = ?1 ORDER BY id ASC;"),
            [day],
        )
    }

    fn delete_check_in(&self, id: CheckInId) -> RepoResult<CheckIn> {
        let check_in = self.get_check_in(id)?;
        self.conn
            .execute("DELETE FROM check_ins WHERE id = ?1;", [id])?;
        Ok(check_in)
    }
}

fn load_priority_ids(conn: &Connection, check_in_id: CheckInId) -> RepoResult<Vec<PriorityId>> {
    let mut stmt = conn.prepare(
        "SELECT priority_id FROM check_in_priorities
         WHERE check_in_id = ?1
         ORDER BY position ASC;",
    )?;
    let ids = stmt
        .query_map([check_in_id], |row| row.get::<_, PriorityId>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}
