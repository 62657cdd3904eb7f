//! Seed collections (users, priorities, check-ins) and their import.
//!
//! # Responsibility
//! - Parse the static JSON collections, embedded or from a directory.
//! - Import them into a freshly migrated database in one transaction.
//!
//! # Invariants
//! - Seed ids are preserved; the id sequences continue after the seed maximum.
//! - Legacy string user references resolve to canonical numeric ids.
//! - Every user reference, numeric or legacy, must name a seeded user.
//! - Timestamps are RFC 3339 in JSON and epoch milliseconds in storage.
//! - Check-in dates are truncated to the UTC start of day.

use crate::clock::truncate_to_day_ms;
use crate::db::DbError;
use crate::model::category::Category;
use crate::model::user::UserId;
use chrono::DateTime;
use rusqlite::{params, Connection};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const USERS_FILE: &str = "users.json";
pub const PRIORITIES_FILE: &str = "priorities.json";
pub const CHECK_INS_FILE: &str = "checkins.json";

const EMBEDDED_USERS: &str = include_str!("../../seed/users.json");
const EMBEDDED_PRIORITIES: &str = include_str!("../../seed/priorities.json");
const EMBEDDED_CHECK_INS: &str = include_str!("../../seed/checkins.json");

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug)]
pub enum SeedError {
    Io { path: PathBuf, source: std::io::Error },
    Json { file: String, source: serde_json::Error },
    InvalidTimestamp { field: &'static str, value: String },
    InvalidCategory(String),
    UnknownUser(String),
    Db(DbError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read seed file `{}`: {source}", path.display())
            }
            Self::Json { file, source } => write!(f, "invalid seed JSON in `{file}`: {source}"),
            Self::InvalidTimestamp { field, value } => {
                write!(f, "invalid RFC 3339 timestamp `{value}` in seed field `{field}`")
            }
            Self::InvalidCategory(value) => write!(f, "unknown seed category `{value}`"),
            Self::UnknownUser(reference) => write!(f, "seed references unknown user `{reference}`"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::InvalidTimestamp { .. } | Self::InvalidCategory(_) | Self::UnknownUser(_) => None,
        }
    }
}

impl From<DbError> for SeedError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SeedError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Where seed collections come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeedSource {
    /// Collections compiled into the crate.
    #[default]
    Embedded,
    /// Directory holding `users.json`, `priorities.json` and `checkins.json`.
    Directory(PathBuf),
}

impl SeedSource {
    pub(crate) fn label(&self) -> String {
        match self {
            Self::Embedded => "embedded".to_string(),
            Self::Directory(dir) => dir.display().to_string(),
        }
    }
}

/// User reference as found in seed files: canonical id or legacy handle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SeedUserRef {
    Id(UserId),
    Handle(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUser {
    #[serde(rename = "Id")]
    pub id: UserId,
    #[serde(rename = "id")]
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub weekly_streak: u32,
    pub joined_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPriority {
    #[serde(rename = "Id")]
    pub id: i64,
    pub user_id: SeedUserRef,
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub deferred_to: Option<String>,
    #[serde(default)]
    pub defer_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCheckIn {
    #[serde(rename = "Id")]
    pub id: i64,
    pub user_id: SeedUserRef,
    pub date: String,
    pub priorities: Vec<i64>,
    pub submitted_at: String,
}

/// Parsed seed collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedData {
    pub users: Vec<SeedUser>,
    pub priorities: Vec<SeedPriority>,
    pub check_ins: Vec<SeedCheckIn>,
}

/// Row counts written by `apply_seed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub priorities: usize,
    pub check_ins: usize,
}

impl SeedData {
    pub fn load(source: &SeedSource) -> SeedResult<Self> {
        match source {
            SeedSource::Embedded => Self::embedded(),
            SeedSource::Directory(dir) => Self::from_dir(dir),
        }
    }

    pub fn embedded() -> SeedResult<Self> {
        Self::from_json(EMBEDDED_USERS, EMBEDDED_PRIORITIES, EMBEDDED_CHECK_INS)
    }

    pub fn from_dir(dir: &Path) -> SeedResult<Self> {
        let users = read_seed_file(dir, USERS_FILE)?;
        let priorities = read_seed_file(dir, PRIORITIES_FILE)?;
        let check_ins = read_seed_file(dir, CHECK_INS_FILE)?;
        Self::from_json(&users, &priorities, &check_ins)
    }

    pub fn from_json(users: &str, priorities: &str, check_ins: &str) -> SeedResult<Self> {
        Ok(Self {
            users: parse_collection(USERS_FILE, users)?,
            priorities: parse_collection(PRIORITIES_FILE, priorities)?,
            check_ins: parse_collection(CHECK_INS_FILE, check_ins)?,
        })
    }
}

/// Imports seed collections into `conn` inside a single transaction.
pub fn apply_seed(conn: &mut Connection, data: &SeedData) -> SeedResult<SeedReport> {
    let tx = conn.transaction()?;

    let mut known = KnownUsers::default();
    for user in &data.users {
        tx.execute(
            "INSERT INTO users (id, handle, name, avatar, weekly_streak, joined_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                user.id,
                user.handle.as_str(),
                user.name.as_str(),
                user.avatar.as_deref(),
                user.weekly_streak,
                parse_timestamp("joinedAt", &user.joined_at)?,
            ],
        )?;
        known.handles.insert(user.handle.as_str(), user.id);
        known.ids.insert(user.id);
    }

    for priority in &data.priorities {
        let category = match priority.category.as_deref() {
            Some(label) => Some(
                Category::from_label(label)
                    .ok_or_else(|| SeedError::InvalidCategory(label.to_string()))?,
            ),
            None => None,
        };
        tx.execute(
            "INSERT INTO priorities (
                id, user_id, text, category, created_at, completed_at, deferred_to, defer_count
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                priority.id,
                known.resolve(&priority.user_id)?,
                priority.text.as_str(),
                category.map(Category::label),
                parse_timestamp("createdAt", &priority.created_at)?,
                parse_optional_timestamp("completedAt", priority.completed_at.as_deref())?,
                parse_optional_timestamp("deferredTo", priority.deferred_to.as_deref())?,
                priority.defer_count,
            ],
        )?;
    }

    for check_in in &data.check_ins {
        let date = parse_timestamp("date", &check_in.date)?;
        let day = truncate_to_day_ms(date).ok_or_else(|| SeedError::InvalidTimestamp {
            field: "date",
            value: check_in.date.clone(),
        })?;
        tx.execute(
            "INSERT INTO check_ins (id, user_id, day, submitted_at) VALUES (?1, ?2, ?3, ?4);",
            params![
                check_in.id,
                known.resolve(&check_in.user_id)?,
                day,
                parse_timestamp("submittedAt", &check_in.submitted_at)?,
            ],
        )?;
        for (position, priority_id) in check_in.priorities.iter().enumerate() {
            tx.execute(
                "INSERT INTO check_in_priorities (check_in_id, position, priority_id)
                 VALUES (?1, ?2, ?3);",
                params![check_in.id, position as i64, priority_id],
            )?;
        }
    }

    tx.commit()?;

    Ok(SeedReport {
        users: data.users.len(),
        priorities: data.priorities.len(),
        check_ins: data.check_ins.len(),
    })
}

fn read_seed_file(dir: &Path, file: &str) -> SeedResult<String> {
    let path = dir.join(file);
    std::fs::read_to_string(&path).map_err(|source| SeedError::Io { path, source })
}

fn parse_collection<T: for<'de> Deserialize<'de>>(file: &str, json: &str) -> SeedResult<Vec<T>> {
    serde_json::from_str(json).map_err(|source| SeedError::Json {
        file: file.to_string(),
        source,
    })
}

/// Users written so far by `apply_seed`, by handle and by id.
#[derive(Default)]
struct KnownUsers<'a> {
    handles: HashMap<&'a str, UserId>,
    ids: HashSet<UserId>,
}

impl KnownUsers<'_> {
    fn resolve(&self, reference: &SeedUserRef) -> SeedResult<UserId> {
        match reference {
            SeedUserRef::Id(id) if self.ids.contains(id) => Ok(*id),
            SeedUserRef::Id(id) => Err(SeedError::UnknownUser(id.to_string())),
            SeedUserRef::Handle(handle) => self
                .handles
                .get(handle.as_str())
                .copied()
                .ok_or_else(|| SeedError::UnknownUser(handle.clone())),
        }
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> SeedResult<i64> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.timestamp_millis())
        .map_err(|_| SeedError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

fn parse_optional_timestamp(field: &'static str, value: Option<&str>) -> SeedResult<Option<i64>> {
    value.map(|raw| parse_timestamp(field, raw)).transpose()
}
