//! Configuration validation

use crate::settings::{Config, DaemonConfig, Script, TimerConfig};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("long_break_interval must be at least 1, got {0}")]
    InvalidLongBreakInterval(u32),

    #[error("Script '{script}': {message}")]
    ScriptError { script: String, message: String },

    #[error("Duplicate script name: {0}")]
    DuplicateScriptName(String),
}

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> Vec<ValidationError> {
    let mut errors = validate_timer(&config.timer);
    errors.extend(validate_daemon(&config.daemon));

    let mut seen_names = HashSet::new();
    for script in &config.scripts {
        if !script.name.is_empty() && !seen_names.insert(script.name.as_str()) {
            errors.push(ValidationError::DuplicateScriptName(script.name.clone()));
        }
        errors.extend(validate_script(script));
    }

    errors
}

/// Validate timer settings; the engine applies the same rules to runtime updates
pub fn validate_timer(timer: &TimerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("focus_seconds", timer.focus_duration),
        ("break_seconds", timer.break_duration),
        ("long_break_seconds", timer.long_break_duration),
    ] {
        if value.is_zero() {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    if timer.long_break_interval < 1 {
        errors.push(ValidationError::InvalidLongBreakInterval(
            timer.long_break_interval,
        ));
    }

    errors
}

fn validate_daemon(daemon: &DaemonConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if daemon.frame_interval.is_zero() {
        errors.push(ValidationError::ZeroDuration {
            field: "frame_interval_ms",
        });
    }
    if daemon.fallback_interval.is_zero() {
        errors.push(ValidationError::ZeroDuration {
            field: "fallback_interval_ms",
        });
    }

    errors
}

fn validate_script(script: &Script) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let label = if script.name.is_empty() {
        "<unnamed>".to_string()
    } else {
        script.name.clone()
    };

    if script.name.trim().is_empty() {
        errors.push(ValidationError::ScriptError {
            script: label.clone(),
            message: "name must not be empty".into(),
        });
    }

    match script.argv.first() {
        None => errors.push(ValidationError::ScriptError {
            script: label.clone(),
            message: "argv must not be empty".into(),
        }),
        Some(program) if program.trim().is_empty() => {
            errors.push(ValidationError::ScriptError {
                script: label.clone(),
                message: "program must not be empty".into(),
            })
        }
        Some(_) => {}
    }

    if script.triggers.is_empty() {
        errors.push(ValidationError::ScriptError {
            script: label,
            message: "at least one trigger is required".into(),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptTrigger;
    use std::time::Duration;

    fn script(name: &str, argv: &[&str]) -> Script {
        Script {
            name: name.into(),
            argv: argv.iter().map(|s| s.to_string()).collect(),
            triggers: vec![ScriptTrigger::FocusEnd],
            enabled: true,
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_empty());
    }

    #[test]
    fn timer_errors_are_collected() {
        let timer = TimerConfig {
            focus_duration: Duration::ZERO,
            break_duration: Duration::ZERO,
            long_break_duration: Duration::ZERO,
            long_break_interval: 0,
            ..TimerConfig::default()
        };
        let errors = validate_timer(&timer);
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroDuration {
            field: "focus_seconds"
        }));
        assert!(errors.contains(&ValidationError::InvalidLongBreakInterval(0)));
    }

    #[test]
    fn zero_tick_intervals_rejected() {
        let mut config = Config::default();
        config.daemon.frame_interval = Duration::ZERO;
        config.daemon.fallback_interval = Duration::ZERO;
        assert_eq!(validate_config(&config).len(), 2);
    }

    #[test]
    fn duplicate_script_names_rejected() {
        let config = Config {
            scripts: vec![script("lights", &["a"]), script("lights", &["b"])],
            ..Config::default()
        };
        let errors = validate_config(&config);
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateScriptName("lights".into())]
        );
    }

    #[test]
    fn script_requires_name_argv_and_trigger() {
        let mut bad = script("", &[]);
        bad.triggers.clear();
        let errors = validate_script(&bad);
        assert_eq!(errors.len(), 3);
        assert!(matches!(
            &errors[0],
            ValidationError::ScriptError { script, .. } if script == "<unnamed>"
        ));
    }
}
