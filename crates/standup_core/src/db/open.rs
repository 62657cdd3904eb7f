//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::seed::{apply_seed, SeedData, SeedResult, SeedSource};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

/// Opens an empty in-memory database with the latest schema.
///
/// Every call yields an independent database, so tests get isolated stores.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let result = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(|mut conn| bootstrap_connection(&mut conn).map(|()| conn));

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode=memory duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode=memory duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

/// Opens an in-memory database and loads seed collections from `source`.
///
/// # Side effects
/// - Emits `db_seed` logging events with row counts.
pub fn open_seeded_db(source: &SeedSource) -> SeedResult<Connection> {
    let data = SeedData::load(source)?;
    let mut conn = open_db_in_memory()?;
    let started_at = Instant::now();

    match apply_seed(&mut conn, &data) {
        Ok(report) => {
            info!(
                "event=db_seed module=db status=ok source={} users={} priorities={} check_ins={} duration_ms={}",
                source.label(),
                report.users,
                report.priorities,
                report.check_ins,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_seed module=db status=error source={} error={}",
                source.label(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    apply_migrations(conn)?;
    Ok(())
}
