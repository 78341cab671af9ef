//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ScriptTrigger;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Session durations and auto-start behaviour
    #[serde(default)]
    pub timer: RawTimerConfig,

    /// Global daemon settings
    #[serde(default)]
    pub daemon: RawDaemonConfig,

    /// User scripts run on lifecycle triggers
    #[serde(default)]
    pub scripts: Vec<RawScript>,
}

/// Timer settings; anything omitted falls back to the defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTimerConfig {
    pub focus_seconds: Option<u64>,
    pub break_seconds: Option<u64>,
    pub long_break_seconds: Option<u64>,

    /// Every Nth completed focus session is followed by a long break
    pub long_break_interval: Option<u32>,

    pub auto_start_focus: Option<bool>,
    pub auto_start_break: Option<bool>,
    pub system_notifications: Option<bool>,
}

/// Daemon-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDaemonConfig {
    /// Data directory for the session store
    pub data_dir: Option<PathBuf>,

    /// Tick period while visible
    pub frame_interval_ms: Option<u64>,

    /// Tick period while hidden
    pub fallback_interval_ms: Option<u64>,

    /// Start in the hidden state
    pub start_hidden: Option<bool>,
}

/// Raw script definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawScript {
    /// Unique name, used in logs
    pub name: String,

    /// Program and arguments
    pub argv: Vec<String>,

    #[serde(default)]
    pub triggers: Vec<ScriptTrigger>,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}
