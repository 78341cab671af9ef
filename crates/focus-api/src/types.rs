//! Shared types for focusd

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Minimum elapsed time for a focus session to be worth persisting
pub const MIN_PERSISTED_FOCUS: Duration = Duration::from_secs(60);

/// Kind of session the timer is counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Focus,
    Break,
    LongBreak,
}

impl SessionType {
    pub fn is_break(&self) -> bool {
        matches!(self, SessionType::Break | SessionType::LongBreak)
    }

    /// Stable identifier used in storage and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Focus => "focus",
            SessionType::Break => "break",
            SessionType::LongBreak => "long_break",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Focus => "Focus session",
            SessionType::Break => "Break",
            SessionType::LongBreak => "Long break",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(SessionType::Focus),
            "break" => Ok(SessionType::Break),
            "long_break" => Ok(SessionType::LongBreak),
            other => Err(format!("Unknown session type: {}", other)),
        }
    }
}

/// Live state of the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_type: SessionType,
    /// Target length of the session
    pub duration: Duration,
    /// Time counted so far, never above `duration`
    pub elapsed: Duration,
    /// Number of completed focus sessions
    pub iteration: u32,
    pub is_playing: bool,
    /// Wall-clock time the session was first started
    pub started_at: Option<DateTime<Local>>,
}

impl SessionState {
    /// The state a fresh timer begins in
    pub fn initial(focus_duration: Duration) -> Self {
        Self {
            session_type: SessionType::Focus,
            duration: focus_duration,
            elapsed: Duration::ZERO,
            iteration: 0,
            is_playing: false,
            started_at: None,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }

    /// Immutable copy of the fields a host needs once a session ends
    pub fn snapshot(&self) -> CompletedSession {
        CompletedSession {
            session_type: self.session_type,
            elapsed: self.elapsed,
            duration: self.duration,
            started_at: self.started_at,
            iteration: self.iteration,
        }
    }
}

/// Snapshot of a session taken when it completes, is skipped, or is discarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub session_type: SessionType,
    pub elapsed: Duration,
    pub duration: Duration,
    pub started_at: Option<DateTime<Local>>,
    /// Completed focus sessions before this one ended
    pub iteration: u32,
}

impl CompletedSession {
    /// Only focus sessions that actually ran for at least a minute are kept.
    pub fn is_persistable(&self) -> bool {
        self.session_type == SessionType::Focus
            && self.started_at.is_some()
            && self.elapsed >= MIN_PERSISTED_FOCUS
    }
}

/// How a recorded session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    /// Ran to its full duration
    Completed,
    /// Skipped by the user before finishing
    Skipped,
    /// Progress discarded by a restart
    Restarted,
}

impl SessionEndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEndReason::Completed => "completed",
            SessionEndReason::Skipped => "skipped",
            SessionEndReason::Restarted => "restarted",
        }
    }
}

impl FromStr for SessionEndReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(SessionEndReason::Completed),
            "skipped" => Ok(SessionEndReason::Skipped),
            "restarted" => Ok(SessionEndReason::Restarted),
            other => Err(format!("Unknown end reason: {}", other)),
        }
    }
}

/// Whether the host surface is currently visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Timing strategy driving the elapsed-time tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickSourceKind {
    /// High-frequency monotonic ticks, delivered while visible
    Frame,
    /// Low-frequency wall-clock recomputation, used while hidden
    Fallback,
}

impl From<Visibility> for TickSourceKind {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Visible => TickSourceKind::Frame,
            Visibility::Hidden => TickSourceKind::Fallback,
        }
    }
}

/// A planned focus session waiting in the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedSession {
    pub duration: Duration,
    /// How many focus sessions of this length remain
    pub iterations: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focus_snapshot(elapsed_secs: u64, started: bool) -> CompletedSession {
        CompletedSession {
            session_type: SessionType::Focus,
            elapsed: Duration::from_secs(elapsed_secs),
            duration: Duration::from_secs(1500),
            started_at: started.then(Local::now),
            iteration: 0,
        }
    }

    #[test]
    fn persistable_requires_a_minute_of_focus() {
        assert!(!focus_snapshot(59, true).is_persistable());
        assert!(focus_snapshot(60, true).is_persistable());
        assert!(!focus_snapshot(600, false).is_persistable());

        let mut long_break = focus_snapshot(600, true);
        long_break.session_type = SessionType::LongBreak;
        assert!(!long_break.is_persistable());
    }

    #[test]
    fn session_type_round_trips_through_str() {
        for ty in [SessionType::Focus, SessionType::Break, SessionType::LongBreak] {
            assert_eq!(ty.as_str().parse::<SessionType>().unwrap(), ty);
        }
        assert!("nap".parse::<SessionType>().is_err());
    }

    #[test]
    fn remaining_saturates() {
        let mut state = SessionState::initial(Duration::from_secs(10));
        state.elapsed = Duration::from_secs(4);
        assert_eq!(state.remaining(), Duration::from_secs(6));
        state.elapsed = Duration::from_secs(12);
        assert_eq!(state.remaining(), Duration::ZERO);
    }

    #[test]
    fn visibility_selects_tick_source() {
        assert_eq!(TickSourceKind::from(Visibility::Visible), TickSourceKind::Frame);
        assert_eq!(TickSourceKind::from(Visibility::Hidden), TickSourceKind::Fallback);
    }

    #[test]
    fn session_type_serialization() {
        let json = serde_json::to_string(&SessionType::LongBreak).unwrap();
        assert_eq!(json, "\"long_break\"");
    }
}
