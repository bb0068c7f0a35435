//! SQLite event store implementation.

use crate::{Error, Event, EventKind, Result, SessionId};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Summary of one stored session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub message_count: usize,
}

/// SQLite-backed, append-only event store.
///
/// The connection is guarded by a mutex so one store can be shared across
/// request tasks; every method holds the lock only for its own statement.
pub struct EventStore {
    conn: Mutex<Connection>,
}

impl EventStore {
    /// Open or create an event store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory event store. Its contents live as long as the store.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                session_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                kind TEXT NOT NULL,
                data TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_session
                ON events(session_id, seq);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::Poisoned)
    }

    /// Append an event to the store.
    pub fn append(&self, event: &Event) -> Result<()> {
        let data = serde_json::to_string(&event.kind)?;
        self.conn()?.execute(
            "INSERT INTO events (id, session_id, timestamp, kind, data) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.id.to_string(),
                event.session_id.as_str(),
                event.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                event.kind.name(),
                data,
            ],
        )?;
        Ok(())
    }

    /// Load all events for a session in the order they were appended.
    pub fn load_session(&self, session_id: &SessionId) -> Result<Vec<Event>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, data FROM events
             WHERE session_id = ?1 ORDER BY seq",
        )?;

        let rows = stmt
            .query_map([session_id.as_str()], |row| {
                let id: String = row.get(0)?;
                let timestamp: String = row.get(1)?;
                let data: String = row.get(2)?;
                Ok((id, timestamp, data))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, timestamp, data)| {
                let kind: EventKind = serde_json::from_str(&data)?;
                Ok(Event {
                    id: id.parse().map_err(|e| corrupt(&id, e))?,
                    session_id: session_id.clone(),
                    timestamp: parse_timestamp(&id, &timestamp)?,
                    kind,
                })
            })
            .collect()
    }

    /// Delete every event of a session. Returns the number of events removed.
    pub fn clear_session(&self, session_id: &SessionId) -> Result<usize> {
        let removed = self.conn()?.execute(
            "DELETE FROM events WHERE session_id = ?1",
            [session_id.as_str()],
        )?;
        Ok(removed)
    }

    /// List sessions, most recently active first.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT session_id, MIN(timestamp), MAX(timestamp),
                    SUM(CASE WHEN kind = 'message' THEN 1 ELSE 0 END)
             FROM events GROUP BY session_id ORDER BY MAX(seq) DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let started: String = row.get(1)?;
                let last: String = row.get(2)?;
                let messages: i64 = row.get(3)?;
                Ok((id, started, last, messages))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, started, last, messages)| {
                Ok(SessionSummary {
                    started_at: parse_timestamp(&id, &started)?,
                    last_activity: parse_timestamp(&id, &last)?,
                    message_count: usize::try_from(messages).unwrap_or_default(),
                    id: SessionId::new(id),
                })
            })
            .collect()
    }
}

fn parse_timestamp(id: &str, raw: &str) -> Result<DateTime<Utc>> {
    raw.parse().map_err(|e| corrupt(id, e))
}

fn corrupt(id: &str, reason: impl std::fmt::Display) -> Error {
    Error::Corrupt {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
