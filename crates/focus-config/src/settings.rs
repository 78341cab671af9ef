//! Validated configuration types

use focus_api::SessionType;
use focus_util::default_data_dir;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::schema::{RawConfig, RawDaemonConfig, RawScript, RawTimerConfig};
use crate::validation::validate_timer;
use crate::{ConfigError, ConfigResult};

pub const DEFAULT_FOCUS_SECONDS: u64 = 25 * 60;
pub const DEFAULT_BREAK_SECONDS: u64 = 5 * 60;
pub const DEFAULT_LONG_BREAK_SECONDS: u64 = 10 * 60;
pub const DEFAULT_LONG_BREAK_INTERVAL: u32 = 4;
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 100;
pub const DEFAULT_FALLBACK_INTERVAL_MS: u64 = 250;

/// Complete validated configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub timer: TimerConfig,
    pub daemon: DaemonConfig,
    pub scripts: Vec<Script>,
}

impl Config {
    /// Convert from raw config, filling in defaults
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            timer: TimerConfig::from_raw(raw.timer),
            daemon: DaemonConfig::from_raw(raw.daemon),
            scripts: raw.scripts.into_iter().map(Script::from_raw).collect(),
        }
    }

    /// Scripts that should run for `trigger`
    pub fn scripts_for(&self, trigger: ScriptTrigger) -> impl Iterator<Item = &Script> {
        self.scripts
            .iter()
            .filter(move |s| s.enabled && s.triggers.contains(&trigger))
    }
}

/// Settings consumed by the timer engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    pub focus_duration: Duration,
    pub break_duration: Duration,
    pub long_break_duration: Duration,
    pub long_break_interval: u32,
    /// Start the next focus session automatically after a break ends
    pub auto_start_focus: bool,
    /// Start the next break automatically after a focus session ends
    pub auto_start_break: bool,
    pub system_notifications: bool,
}

impl TimerConfig {
    fn from_raw(raw: RawTimerConfig) -> Self {
        let defaults = Self::default();
        Self {
            focus_duration: raw
                .focus_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.focus_duration),
            break_duration: raw
                .break_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.break_duration),
            long_break_duration: raw
                .long_break_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.long_break_duration),
            long_break_interval: raw
                .long_break_interval
                .unwrap_or(defaults.long_break_interval),
            auto_start_focus: raw.auto_start_focus.unwrap_or(defaults.auto_start_focus),
            auto_start_break: raw.auto_start_break.unwrap_or(defaults.auto_start_break),
            system_notifications: raw
                .system_notifications
                .unwrap_or(defaults.system_notifications),
        }
    }

    /// Configured length of a session of the given type
    pub fn duration_for(&self, session_type: SessionType) -> Duration {
        match session_type {
            SessionType::Focus => self.focus_duration,
            SessionType::Break => self.break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }

    /// Whether a session of the given type starts playing on entry
    pub fn auto_start_for(&self, session_type: SessionType) -> bool {
        if session_type.is_break() {
            self.auto_start_break
        } else {
            self.auto_start_focus
        }
    }

    /// Check the timer invariants, collecting every violation
    pub fn validate(&self) -> ConfigResult<()> {
        let errors = validate_timer(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationFailed { errors })
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_duration: Duration::from_secs(DEFAULT_FOCUS_SECONDS),
            break_duration: Duration::from_secs(DEFAULT_BREAK_SECONDS),
            long_break_duration: Duration::from_secs(DEFAULT_LONG_BREAK_SECONDS),
            long_break_interval: DEFAULT_LONG_BREAK_INTERVAL,
            auto_start_focus: false,
            auto_start_break: false,
            system_notifications: true,
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    pub data_dir: PathBuf,
    pub frame_interval: Duration,
    pub fallback_interval: Duration,
    pub start_hidden: bool,
}

impl DaemonConfig {
    fn from_raw(raw: RawDaemonConfig) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: raw.data_dir.unwrap_or(defaults.data_dir),
            frame_interval: raw
                .frame_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.frame_interval),
            fallback_interval: raw
                .fallback_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.fallback_interval),
            start_hidden: raw.start_hidden.unwrap_or(defaults.start_hidden),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            frame_interval: Duration::from_millis(DEFAULT_FRAME_INTERVAL_MS),
            fallback_interval: Duration::from_millis(DEFAULT_FALLBACK_INTERVAL_MS),
            start_hidden: false,
        }
    }
}

/// Lifecycle points a user script can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptTrigger {
    FocusStart,
    FocusPause,
    FocusEnd,
    BreakStart,
    BreakPause,
    BreakEnd,
}

impl ScriptTrigger {
    /// Trigger for a session of this type starting or resuming
    pub fn start_of(session_type: SessionType) -> Self {
        if session_type.is_break() {
            ScriptTrigger::BreakStart
        } else {
            ScriptTrigger::FocusStart
        }
    }

    pub fn pause_of(session_type: SessionType) -> Self {
        if session_type.is_break() {
            ScriptTrigger::BreakPause
        } else {
            ScriptTrigger::FocusPause
        }
    }

    pub fn end_of(session_type: SessionType) -> Self {
        if session_type.is_break() {
            ScriptTrigger::BreakEnd
        } else {
            ScriptTrigger::FocusEnd
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptTrigger::FocusStart => "focus_start",
            ScriptTrigger::FocusPause => "focus_pause",
            ScriptTrigger::FocusEnd => "focus_end",
            ScriptTrigger::BreakStart => "break_start",
            ScriptTrigger::BreakPause => "break_pause",
            ScriptTrigger::BreakEnd => "break_end",
        }
    }
}

/// A user script bound to one or more triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub name: String,
    pub argv: Vec<String>,
    pub triggers: Vec<ScriptTrigger>,
    pub enabled: bool,
}

impl Script {
    fn from_raw(raw: RawScript) -> Self {
        Self {
            name: raw.name,
            argv: raw.argv,
            triggers: raw.triggers,
            enabled: raw.enabled,
        }
    }
}
