//! Notification wording

use focus_api::SessionType;
use focus_config::TimerConfig;

/// Message shown when a session runs out
pub fn completed_message(session_type: SessionType, timer: &TimerConfig) -> String {
    let next = match session_type {
        SessionType::Focus if timer.auto_start_break => "\nStarting a break!",
        SessionType::Break | SessionType::LongBreak if timer.auto_start_focus => {
            "\nStarting a focus session!"
        }
        _ => "",
    };
    format!("{} has completed.{}", session_type.label(), next)
}

pub fn paused_message(session_type: SessionType) -> String {
    format!("{} has been paused.", session_type.label())
}

pub fn resumed_message(session_type: SessionType) -> String {
    format!("{} has been resumed.", session_type.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_mentions_auto_start() {
        let timer = TimerConfig {
            auto_start_break: true,
            ..TimerConfig::default()
        };
        assert_eq!(
            completed_message(SessionType::Focus, &timer),
            "Focus session has completed.\nStarting a break!"
        );
        assert_eq!(
            completed_message(SessionType::LongBreak, &timer),
            "Long break has completed."
        );
    }

    #[test]
    fn lifecycle_wording() {
        assert_eq!(paused_message(SessionType::Break), "Break has been paused.");
        assert_eq!(
            resumed_message(SessionType::Focus),
            "Focus session has been resumed."
        );
    }
}
