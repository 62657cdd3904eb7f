//! User store contracts and SQLite implementation.
//!
//! # Invariants
//! - `id` values are assigned by storage and never reused.
//! - `handle` is unique across users.

use crate::db::migrations::ensure_latest;
use crate::model::user::{NewUser, User, UserId, UserPatch};
use crate::repo::{is_unique_violation, EntityRef, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    handle,
    name,
    avatar,
    weekly_streak,
    joined_at
FROM users";

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    /// Lists users ordered by id.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn get_user(&self, id: UserId) -> RepoResult<User>;
    fn find_user_by_handle(&self, handle: &str) -> RepoResult<Option<User>>;
    fn create_user(&self, user: &NewUser, joined_at: i64) -> RepoResult<User>;
    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User>;
    /// Removes the user and returns the removed record.
    fn delete_user(&self, id: UserId) -> RepoResult<User>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Binds the repository to a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_latest(conn)?;
        Ok(Self { conn })
    }

    fn find_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
        let users = stmt
            .query_map([], parse_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn get_user(&self, id: UserId) -> RepoResult<User> {
        self.find_user(id)?
            .ok_or(RepoError::NotFound(EntityRef::User(id)))
    }

    fn find_user_by_handle(&self, handle: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE handle = ?1;"),
                [handle],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn create_user(&self, user: &NewUser, joined_at: i64) -> RepoResult<User> {
        let handle = user.resolve_handle();
        let inserted = self.conn.execute(
            "INSERT INTO users (handle, name, avatar, weekly_streak, joined_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                handle.as_str(),
                user.name.as_str(),
                user.avatar.as_deref(),
                user.weekly_streak,
                joined_at,
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::InvalidArgument(format!(
                    "user handle `{handle}` is already taken"
                )));
            }
            Err(err) => return Err(err.into()),
        }

        self.get_user(self.conn.last_insert_rowid())
    }

    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User> {
        let mut user = self.get_user(id)?;
        user.apply(patch);

        self.conn.execute(
            "UPDATE users
             SET
                name = ?1,
                avatar = ?2,
                weekly_streak = ?3
             WHERE id = ?4;",
            params![
                user.name.as_str(),
                user.avatar.as_deref(),
                user.weekly_streak,
                id,
            ],
        )?;

        Ok(user)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<User> {
        let user = self.get_user(id)?;
        self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        Ok(user)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        handle: row.get("handle")?,
        name: row.get("name")?,
        avatar: row.get("avatar")?,
        weekly_streak: row.get("weekly_streak")?,
        joined_at: row.get("joined_at")?,
    })
}
