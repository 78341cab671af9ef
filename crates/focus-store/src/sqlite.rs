//! SQLite-based store implementation

use chrono::{DateTime, Local, NaiveDate};
use focus_api::{SessionEndReason, SessionType};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{AuditEvent, SessionRecord, Store, StoreError, StoreResult};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("Store lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            -- Finished sessions
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_type TEXT NOT NULL,
                day TEXT NOT NULL,
                started_at TEXT NOT NULL,
                ended_at TEXT NOT NULL,
                elapsed_ms INTEGER NOT NULL,
                duration_ms INTEGER NOT NULL,
                iteration INTEGER NOT NULL,
                reason TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            CREATE INDEX IF NOT EXISTS idx_sessions_day ON sessions(day);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl Store for SqliteStore {
    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.lock()?;
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = parse_timestamp(&timestamp_str).unwrap_or_else(|_| focus_util::now());
            let event: crate::AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn record_session(&self, record: &SessionRecord) -> StoreResult<i64> {
        let elapsed_ms = duration_to_millis(record.elapsed)?;
        let duration_ms = duration_to_millis(record.duration)?;
        let conn = self.lock()?;
        let day = record.started_at.date_naive().format(DAY_FORMAT).to_string();

        conn.execute(
            r#"
            INSERT INTO sessions
                (session_type, day, started_at, ended_at, elapsed_ms, duration_ms, iteration, reason)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                record.session_type.as_str(),
                day,
                record.started_at.to_rfc3339(),
                record.ended_at.to_rfc3339(),
                elapsed_ms,
                duration_ms,
                record.iteration,
                record.reason.as_str(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(
            record_id = id,
            session_type = %record.session_type,
            elapsed_secs = record.elapsed.as_secs(),
            reason = record.reason.as_str(),
            "Session recorded"
        );
        Ok(id)
    }

    fn recent_sessions(&self, limit: usize) -> StoreResult<Vec<SessionRecord>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, session_type, started_at, ended_at, elapsed_ms, duration_ms, iteration, reason
            FROM sessions ORDER BY id DESC LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map([limit], |row| {
            Ok(RawSessionRow {
                id: row.get(0)?,
                session_type: row.get(1)?,
                started_at: row.get(2)?,
                ended_at: row.get(3)?,
                elapsed_ms: row.get(4)?,
                duration_ms: row.get(5)?,
                iteration: row.get(6)?,
                reason: row.get(7)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn focus_time_on(&self, day: NaiveDate) -> StoreResult<Duration> {
        let conn = self.lock()?;
        let day_str = day.format(DAY_FORMAT).to_string();

        let total_ms: i64 = conn.query_row(
            "SELECT COALESCE(SUM(elapsed_ms), 0) FROM sessions WHERE day = ? AND session_type = ?",
            params![day_str, SessionType::Focus.as_str()],
            |row| row.get(0),
        )?;

        Ok(Duration::from_millis(total_ms.max(0) as u64))
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

struct RawSessionRow {
    id: i64,
    session_type: String,
    started_at: String,
    ended_at: String,
    elapsed_ms: i64,
    duration_ms: i64,
    iteration: u32,
    reason: String,
}

impl RawSessionRow {
    fn into_record(self) -> StoreResult<SessionRecord> {
        let session_type: SessionType = self.session_type.parse().map_err(StoreError::InvalidRecord)?;
        let reason: SessionEndReason = self.reason.parse().map_err(StoreError::InvalidRecord)?;

        Ok(SessionRecord {
            id: self.id,
            session_type,
            started_at: parse_timestamp(&self.started_at)?,
            ended_at: parse_timestamp(&self.ended_at)?,
            elapsed: Duration::from_millis(self.elapsed_ms.max(0) as u64),
            duration: Duration::from_millis(self.duration_ms.max(0) as u64),
            iteration: self.iteration,
            reason,
        })
    }
}

fn duration_to_millis(d: Duration) -> StoreResult<i64> {
    i64::try_from(d.as_millis())
        .map_err(|_| StoreError::InvalidRecord(format!("duration {:?} too large to store", d)))
}

fn parse_timestamp(s: &str) -> StoreResult<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| StoreError::InvalidRecord(format!("bad timestamp '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuditEventType;
    use chrono::TimeZone;

    fn record(day: u32, elapsed_secs: u64, session_type: SessionType) -> SessionRecord {
        let started_at = Local.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap();
        SessionRecord {
            id: 0,
            session_type,
            started_at,
            ended_at: started_at + chrono::Duration::seconds(elapsed_secs as i64),
            elapsed: Duration::from_secs(elapsed_secs),
            duration: Duration::from_secs(1500),
            iteration: 0,
            reason: SessionEndReason::Completed,
        }
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_audit_log() {
        let store = SqliteStore::in_memory().unwrap();

        store
            .append_audit(AuditEvent::new(AuditEventType::DaemonStarted))
            .unwrap();
        store
            .append_audit(AuditEvent::new(AuditEventType::SessionSkipped {
                session_type: SessionType::Break,
            }))
            .unwrap();

        let events = store.get_recent_audits(10).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0].event,
            AuditEventType::SessionSkipped {
                session_type: SessionType::Break
            }
        ));
        assert!(matches!(events[1].event, AuditEventType::DaemonStarted));
        assert!(events[0].id > events[1].id);
    }

    #[test]
    fn test_session_history() {
        let store = SqliteStore::in_memory().unwrap();
        let mut first = record(1, 1500, SessionType::Focus);
        let mut second = record(2, 90, SessionType::Focus);
        second.reason = SessionEndReason::Skipped;

        first.id = store.record_session(&first).unwrap();
        second.id = store.record_session(&second).unwrap();

        let sessions = store.recent_sessions(10).unwrap();
        assert_eq!(sessions, vec![second.clone(), first]);
        assert_eq!(store.recent_sessions(1).unwrap(), vec![second]);
    }

    #[test]
    fn test_focus_time_per_day() {
        let store = SqliteStore::in_memory().unwrap();
        store.record_session(&record(5, 1500, SessionType::Focus)).unwrap();
        store.record_session(&record(5, 600, SessionType::Focus)).unwrap();
        store.record_session(&record(5, 300, SessionType::Break)).unwrap();
        store.record_session(&record(6, 1500, SessionType::Focus)).unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(store.focus_time_on(day).unwrap(), Duration::from_secs(2100));

        let empty = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(store.focus_time_on(empty).unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_oversized_duration_is_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let mut huge = record(5, 1500, SessionType::Focus);
        huge.elapsed = Duration::MAX;

        assert!(matches!(
            store.record_session(&huge),
            Err(StoreError::InvalidRecord(_))
        ));
        assert!(store.recent_sessions(10).unwrap().is_empty());
    }

    #[test]
    fn test_store_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusd.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.record_session(&record(5, 1500, SessionType::Focus)).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.recent_sessions(10).unwrap().len(), 1);
    }
}
