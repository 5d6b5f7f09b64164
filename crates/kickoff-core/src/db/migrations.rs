//! Database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;
    if version >= CURRENT_VERSION {
        return Ok(());
    }

    tracing::debug!("Migrating event schema from v{version} to v{CURRENT_VERSION}");
    if version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Migration to version 1: identifier and event record tables
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );
        -- Current event identifiers, in the order the API returned them
        CREATE TABLE IF NOT EXISTS event_ids (
            position INTEGER PRIMARY KEY,
            event_id INTEGER NOT NULL UNIQUE
        );
        -- Cached event details; scores are NULL until the match starts
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY,
            tournament_name TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_score INTEGER,
            away_score INTEGER,
            start_time INTEGER NOT NULL,
            favourite INTEGER NOT NULL DEFAULT 0,
            position INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_events_favourite ON events(favourite);
        INSERT INTO schema_version (version) VALUES (1);
        COMMIT;",
    )?;
    tracing::debug!("Applied schema migration v1");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_fresh_database_has_version_zero() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_version(&conn).unwrap(), 0);
    }
}
