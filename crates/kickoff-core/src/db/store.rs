//! Event record store implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for positions

use std::collections::HashSet;

use chrono::DateTime;
use rusqlite::{params, Row, Transaction};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Event, EventId};

/// Trait for locally cached event records
///
/// Two record kinds are kept: the current event identifiers and the full
/// event details. Every "replace" deletes all records of that kind and
/// inserts the new ones in a single transaction.
pub trait EventStore: Send + Sync {
    /// All cached identifiers, in the order they were stored
    fn all_event_ids(&self) -> Result<Vec<EventId>>;

    /// Replace every cached identifier with `ids`
    fn replace_event_ids(&self, ids: &[EventId]) -> Result<()>;

    /// All cached events, in the order they were stored
    fn all_events(&self) -> Result<Vec<Event>>;

    /// Replace every cached event with `events`
    ///
    /// Favourite flags of events that were already favourite survive the
    /// replace.
    fn replace_events(&self, events: &[Event]) -> Result<()>;

    /// Delete a single cached event (no-op when absent)
    fn delete_event(&self, id: EventId) -> Result<()>;

    /// Get a single cached event
    fn get_event(&self, id: EventId) -> Result<Option<Event>>;

    /// Cached events marked as favourite
    fn favourite_events(&self) -> Result<Vec<Event>>;

    /// Identifiers of cached events marked as favourite
    fn favourite_ids(&self) -> Result<Vec<EventId>>;

    /// Mark or unmark a cached event as favourite
    fn set_favourite(&self, id: EventId, favourite: bool) -> Result<()>;
}

const EVENT_COLUMNS: &str = "id, tournament_name, home_team, away_team, home_score, away_score, start_time, favourite";

/// `SQLite` implementation of `EventStore`
pub struct SqliteEventStore {
    db: Database,
}

impl SqliteEventStore {
    /// Create a new store backed by the given database
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open an in-memory store (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Parse an event from a database row
    fn parse_event(row: &Row<'_>) -> rusqlite::Result<Event> {
        let start_secs: i64 = row.get(6)?;
        let start_time = DateTime::from_timestamp(start_secs, 0)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(6, start_secs))?;

        Ok(Event {
            id: EventId::new(row.get(0)?),
            tournament_name: row.get(1)?,
            home_team: row.get(2)?,
            away_team: row.get(3)?,
            home_score: row.get(4)?,
            away_score: row.get(5)?,
            start_time,
            favourite: row.get::<_, i32>(7)? != 0,
        })
    }

    fn query_events(&self, sql: &str) -> Result<Vec<Event>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let events = stmt
            .query_map([], Self::parse_event)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    fn favourite_ids_in(tx: &Transaction<'_>) -> Result<HashSet<i64>> {
        let mut stmt = tx.prepare("SELECT id FROM events WHERE favourite = 1")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<i64>>>()?;
        Ok(ids)
    }
}

impl EventStore for SqliteEventStore {
    fn all_event_ids(&self) -> Result<Vec<EventId>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT event_id FROM event_ids ORDER BY position")?;
        let ids = stmt
            .query_map([], |row| row.get(0).map(EventId::new))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn replace_event_ids(&self, ids: &[EventId]) -> Result<()> {
        let mut conn = self.db.connection()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM event_ids", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO event_ids (position, event_id) VALUES (?, ?)")?;
            for (position, id) in ids.iter().enumerate() {
                stmt.execute(params![position as i64, id.get()])?;
            }
        }

        tx.commit()?;
        tracing::debug!("Replaced cached event ids ({} records)", ids.len());
        Ok(())
    }

    fn all_events(&self) -> Result<Vec<Event>> {
        self.query_events(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY position"
        ))
    }

    fn replace_events(&self, events: &[Event]) -> Result<()> {
        let mut conn = self.db.connection()?;
        let tx = conn.transaction()?;

        let favourites = Self::favourite_ids_in(&tx)?;
        tx.execute("DELETE FROM events", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO events
                 (id, tournament_name, home_team, away_team, home_score, away_score, start_time, favourite, position)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for (position, event) in events.iter().enumerate() {
                let favourite = event.favourite || favourites.contains(&event.id.get());
                stmt.execute(params![
                    event.id.get(),
                    event.tournament_name,
                    event.home_team,
                    event.away_team,
                    event.home_score,
                    event.away_score,
                    event.start_time.timestamp(),
                    i32::from(favourite),
                    position as i64,
                ])?;
            }
        }

        tx.commit()?;
        tracing::debug!("Replaced cached events ({} records)", events.len());
        Ok(())
    }

    fn delete_event(&self, id: EventId) -> Result<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM events WHERE id = ?", params![id.get()])?;
        Ok(())
    }

    fn get_event(&self, id: EventId) -> Result<Option<Event>> {
        let conn = self.db.connection()?;
        let result = conn.query_row(
            &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"),
            params![id.get()],
            Self::parse_event,
        );

        match result {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn favourite_events(&self) -> Result<Vec<Event>> {
        self.query_events(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE favourite = 1 ORDER BY start_time, position"
        ))
    }

    fn favourite_ids(&self) -> Result<Vec<EventId>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT id FROM events WHERE favourite = 1 ORDER BY position")?;
        let ids = stmt
            .query_map([], |row| row.get(0).map(EventId::new))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn set_favourite(&self, id: EventId, favourite: bool) -> Result<()> {
        let conn = self.db.connection()?;
        let rows = conn.execute(
            "UPDATE events SET favourite = ? WHERE id = ?",
            params![i32::from(favourite), id.get()],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(format!("event {id}")));
        }
        Ok(())
    }
}
