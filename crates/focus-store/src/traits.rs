//! Store trait definitions

use chrono::{DateTime, Local, NaiveDate};
use focus_api::{CompletedSession, SessionEndReason, SessionType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{AuditEvent, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Session history

    /// Record a finished session, returning its row id
    fn record_session(&self, record: &SessionRecord) -> StoreResult<i64>;

    /// Get recently recorded sessions, newest first
    fn recent_sessions(&self, limit: usize) -> StoreResult<Vec<SessionRecord>>;

    /// Total recorded focus time for sessions started on `day`
    fn focus_time_on(&self, day: NaiveDate) -> StoreResult<Duration>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// A finished session as kept in the history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Row id; zero until stored
    pub id: i64,
    pub session_type: SessionType,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub elapsed: Duration,
    pub duration: Duration,
    pub iteration: u32,
    pub reason: SessionEndReason,
}

impl SessionRecord {
    /// Build a record from an engine snapshot. Sessions that never started
    /// have nothing to record.
    pub fn from_completed(
        session: &CompletedSession,
        reason: SessionEndReason,
        ended_at: DateTime<Local>,
    ) -> Option<Self> {
        Some(Self {
            id: 0,
            session_type: session.session_type,
            started_at: session.started_at?,
            ended_at,
            elapsed: session.elapsed,
            duration: session.duration,
            iteration: session.iteration,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_api::SessionState;

    #[test]
    fn unstarted_sessions_produce_no_record() {
        let session = SessionState::initial(Duration::from_secs(60)).snapshot();
        assert!(
            SessionRecord::from_completed(&session, SessionEndReason::Skipped, focus_util::now())
                .is_none()
        );
    }
}
