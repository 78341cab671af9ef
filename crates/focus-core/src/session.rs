//! Session transition rules

use focus_api::{SessionState, SessionType};
use focus_config::TimerConfig;
use std::time::Duration;

use crate::SessionQueue;

/// Session type that follows `current`.
///
/// `iteration_after` is the completed focus count once `current` has been
/// counted. A focus session is followed by a long break when that count is a
/// positive multiple of `long_break_interval`, otherwise by a short break.
/// Breaks are always followed by focus.
pub fn next_session_type(
    current: SessionType,
    iteration_after: u32,
    long_break_interval: u32,
) -> SessionType {
    match current {
        SessionType::Focus => {
            if is_long_break_due(iteration_after, long_break_interval) {
                SessionType::LongBreak
            } else {
                SessionType::Break
            }
        }
        SessionType::Break | SessionType::LongBreak => SessionType::Focus,
    }
}

fn is_long_break_due(iteration: u32, interval: u32) -> bool {
    interval > 0 && iteration > 0 && iteration % interval == 0
}

/// Where the machine goes when a session ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: SessionType,
    pub to: SessionType,
    /// Iteration count after the finished session is counted
    pub iteration: u32,
    pub duration: Duration,
    /// Duration was taken from the session queue
    pub from_queue: bool,
    pub auto_start: bool,
}

impl Transition {
    /// Plan the transition out of `finished`.
    ///
    /// Entering focus consumes one iteration of the front queue entry.
    pub fn after(finished: &SessionState, config: &TimerConfig, queue: &mut SessionQueue) -> Self {
        let iteration = match finished.session_type {
            SessionType::Focus => finished.iteration.saturating_add(1),
            _ => finished.iteration,
        };
        let to = next_session_type(finished.session_type, iteration, config.long_break_interval);

        let queued = match to {
            SessionType::Focus => queue.take_next(),
            _ => None,
        };

        Self {
            from: finished.session_type,
            to,
            iteration,
            duration: queued.unwrap_or_else(|| config.duration_for(to)),
            from_queue: queued.is_some(),
            auto_start: config.auto_start_for(to),
        }
    }

    /// Fresh state for the destination session
    pub fn initial_state(&self) -> SessionState {
        SessionState {
            session_type: self.to,
            duration: self.duration,
            elapsed: Duration::ZERO,
            iteration: self.iteration,
            is_playing: false,
            started_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_api::QueuedSession;

    #[test]
    fn test_long_break_every_interval() {
        for iteration in 1..=12 {
            let expected = if iteration % 4 == 0 {
                SessionType::LongBreak
            } else {
                SessionType::Break
            };
            assert_eq!(
                next_session_type(SessionType::Focus, iteration, 4),
                expected,
                "iteration {}",
                iteration
            );
        }
    }

    #[test]
    fn test_breaks_return_to_focus() {
        assert_eq!(next_session_type(SessionType::Break, 3, 4), SessionType::Focus);
        assert_eq!(
            next_session_type(SessionType::LongBreak, 4, 4),
            SessionType::Focus
        );
    }

    #[test]
    fn test_interval_of_one_always_long() {
        assert_eq!(
            next_session_type(SessionType::Focus, 1, 1),
            SessionType::LongBreak
        );
        assert_eq!(next_session_type(SessionType::Focus, 0, 1), SessionType::Break);
    }

    #[test]
    fn test_transition_counts_focus_only() {
        let config = TimerConfig {
            auto_start_break: true,
            ..TimerConfig::default()
        };
        let mut queue = SessionQueue::new();

        let mut focus = SessionState::initial(config.focus_duration);
        focus.iteration = 3;
        let t = Transition::after(&focus, &config, &mut queue);
        assert_eq!(t.to, SessionType::LongBreak);
        assert_eq!(t.iteration, 4);
        assert_eq!(t.duration, config.long_break_duration);
        assert!(t.auto_start);

        let long_break = t.initial_state();
        let t = Transition::after(&long_break, &config, &mut queue);
        assert_eq!(t.to, SessionType::Focus);
        assert_eq!(t.iteration, 4);
        assert!(!t.auto_start);
        assert!(!t.from_queue);
    }

    #[test]
    fn test_transition_into_focus_uses_queue() {
        let config = TimerConfig::default();
        let mut queue = SessionQueue::new();
        queue
            .push(QueuedSession {
                duration: Duration::from_secs(3000),
                iterations: 1,
            })
            .unwrap();

        let mut state = SessionState::initial(config.focus_duration);
        state.session_type = SessionType::Break;
        let t = Transition::after(&state, &config, &mut queue);
        assert_eq!(t.duration, Duration::from_secs(3000));
        assert!(t.from_queue);
        assert!(queue.is_empty());

        // Breaks never draw from the queue
        queue
            .push(QueuedSession {
                duration: Duration::from_secs(3000),
                iterations: 1,
            })
            .unwrap();
        let t = Transition::after(&t.initial_state(), &config, &mut queue);
        assert_eq!(t.to, SessionType::Break);
        assert_eq!(queue.len(), 1);
    }
}
