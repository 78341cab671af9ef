//! Configuration parsing and validation for focusd
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Timer durations, long-break cadence and auto-start behaviour
//! - Daemon tick intervals and data directory
//! - User scripts bound to session lifecycle triggers
//! - Validation with clear error messages

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), "Config file read");
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let config = Config::from_raw(raw);

    let errors = validate_config(&config);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(config)
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn parse_minimal_config() {
        let config = parse_config("config_version = 1").unwrap();
        assert_eq!(config.timer, TimerConfig::default());
        assert!(config.scripts.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let content = r#"
            config_version = 1

            [timer]
            focus_seconds = 1500
            break_seconds = 300
            long_break_seconds = 900
            long_break_interval = 4
            auto_start_focus = true
            auto_start_break = false
            system_notifications = false

            [daemon]
            frame_interval_ms = 50
            fallback_interval_ms = 250
            start_hidden = true

            [[scripts]]
            name = "lights"
            argv = ["/usr/bin/lights", "dim"]
            triggers = ["focus_start", "break_end"]
        "#;

        let config = parse_config(content).unwrap();
        assert_eq!(config.timer.long_break_duration, Duration::from_secs(900));
        assert!(config.timer.auto_start_focus);
        assert!(!config.timer.system_notifications);
        assert_eq!(config.daemon.frame_interval, Duration::from_millis(50));
        assert!(config.daemon.start_hidden);
        assert_eq!(config.scripts.len(), 1);
        assert!(config.scripts[0].enabled);
        assert_eq!(
            config.scripts[0].triggers,
            vec![ScriptTrigger::FocusStart, ScriptTrigger::BreakEnd]
        );
    }

    #[test]
    fn reject_wrong_version() {
        let result = parse_config("config_version = 99");
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_zero_durations() {
        let content = r#"
            config_version = 1

            [timer]
            focus_seconds = 0
            long_break_interval = 0
        "#;

        match parse_config(content) {
            Err(ConfigError::ValidationFailed { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("Expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn reject_unknown_trigger() {
        let content = r#"
            config_version = 1

            [[scripts]]
            name = "x"
            argv = ["true"]
            triggers = ["lunch_time"]
        "#;

        assert!(matches!(parse_config(content), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "config_version = 1\n[timer]\nbreak_seconds = 120").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.timer.break_duration, Duration::from_secs(120));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
