//! Audit event types

use chrono::{DateTime, Local};
use focus_api::{SessionEndReason, SessionType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Types of audit events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Daemon started
    DaemonStarted,

    /// Daemon stopped
    DaemonStopped,

    /// Config reload requested
    ConfigReloaded { success: bool },

    /// Session started or resumed
    SessionResumed { session_type: SessionType },

    SessionPaused { session_type: SessionType },

    /// Session ran out or was skipped
    SessionCompleted {
        session_type: SessionType,
        elapsed: Duration,
        manual: bool,
    },

    SessionSkipped { session_type: SessionType },

    SessionRestarted,

    /// A focus session was written to the history
    SessionRecorded {
        record_id: i64,
        reason: SessionEndReason,
        elapsed: Duration,
    },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: focus_util::now(),
            event,
        }
    }
}
