//! Recording hooks for testing

use focus_api::{CompletedSession, SessionState, SessionType};
use std::sync::Mutex;
use std::time::Duration;

use crate::{HookError, HookResult, TimerHooks};

/// One recorded hook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    StateChange(SessionState),
    Update(Duration),
    Completed {
        session: CompletedSession,
        manual: bool,
    },
    Paused(SessionType),
    Resumed(SessionType),
    Restarted,
    Skipped(SessionType),
    Abandoned(CompletedSession),
}

impl HookCall {
    /// Per-tick noise that lifecycle assertions usually want to skip
    pub fn is_progress(&self) -> bool {
        matches!(self, HookCall::StateChange(_) | HookCall::Update(_))
    }
}

/// Hooks that record every call for later inspection
#[derive(Debug, Default)]
pub struct RecordingHooks {
    calls: Mutex<Vec<HookCall>>,

    /// Configure every hook to return an error
    pub fail_hooks: Mutex<bool>,

    /// Configure every hook to panic
    pub panic_hooks: Mutex<bool>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks that record the call and then return an error
    pub fn failing() -> Self {
        let hooks = Self::new();
        *hooks.fail_hooks.lock().unwrap() = true;
        hooks
    }

    /// Hooks that record the call and then panic
    pub fn panicking() -> Self {
        let hooks = Self::new();
        *hooks.panic_hooks.lock().unwrap() = true;
        hooks
    }

    /// Every call recorded so far
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls excluding state changes and updates
    pub fn lifecycle(&self) -> Vec<HookCall> {
        self.calls()
            .into_iter()
            .filter(|c| !c.is_progress())
            .collect()
    }

    /// Completed sessions with their manual flag
    pub fn completions(&self) -> Vec<(CompletedSession, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HookCall::Completed { session, manual } => Some((session, manual)),
                _ => None,
            })
            .collect()
    }

    /// The most recent state reported through `on_state_change`
    pub fn last_state(&self) -> Option<SessionState> {
        self.calls().into_iter().rev().find_map(|c| match c {
            HookCall::StateChange(state) => Some(state),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: HookCall) -> HookResult<()> {
        self.calls.lock().unwrap().push(call);

        // Guards are released above so a panic here cannot poison them
        if *self.panic_hooks.lock().unwrap() {
            panic!("Mock hook panic");
        }
        if *self.fail_hooks.lock().unwrap() {
            return Err(HookError::Internal("Mock hook failure".into()));
        }
        Ok(())
    }
}

impl TimerHooks for RecordingHooks {
    fn on_state_change(&self, state: &SessionState) -> HookResult<()> {
        self.record(HookCall::StateChange(state.clone()))
    }

    fn on_update(&self, elapsed: Duration) -> HookResult<()> {
        self.record(HookCall::Update(elapsed))
    }

    fn on_completed(&self, session: &CompletedSession, manual: bool) -> HookResult<()> {
        self.record(HookCall::Completed {
            session: session.clone(),
            manual,
        })
    }

    fn on_paused(&self, session_type: SessionType) -> HookResult<()> {
        self.record(HookCall::Paused(session_type))
    }

    fn on_resumed(&self, session_type: SessionType) -> HookResult<()> {
        self.record(HookCall::Resumed(session_type))
    }

    fn on_restarted(&self) -> HookResult<()> {
        self.record(HookCall::Restarted)
    }

    fn on_skipped(&self, skipped: SessionType) -> HookResult<()> {
        self.record(HookCall::Skipped(skipped))
    }

    fn on_abandoned(&self, session: &CompletedSession) -> HookResult<()> {
        self.record(HookCall::Abandoned(session.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoopHooks;

    #[test]
    fn records_calls_in_order() {
        let hooks = RecordingHooks::new();
        hooks.on_resumed(SessionType::Focus).unwrap();
        hooks.on_update(Duration::from_secs(1)).unwrap();
        hooks.on_paused(SessionType::Focus).unwrap();

        assert_eq!(hooks.calls().len(), 3);
        assert_eq!(
            hooks.lifecycle(),
            vec![
                HookCall::Resumed(SessionType::Focus),
                HookCall::Paused(SessionType::Focus)
            ]
        );
    }

    #[test]
    fn failing_hooks_still_record() {
        let hooks = RecordingHooks::failing();
        assert!(hooks.on_restarted().is_err());
        assert_eq!(hooks.calls(), vec![HookCall::Restarted]);
    }

    #[test]
    fn panicking_hooks_leave_state_usable() {
        let hooks = RecordingHooks::panicking();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = hooks.on_restarted();
        }));
        assert!(result.is_err());

        *hooks.panic_hooks.lock().unwrap() = false;
        hooks.on_skipped(SessionType::Break).unwrap();
        assert_eq!(hooks.calls().len(), 2);
    }

    #[test]
    fn noop_hooks_accept_everything() {
        let hooks = NoopHooks;
        let session = SessionState::initial(Duration::from_secs(60)).snapshot();
        assert!(hooks.on_completed(&session, true).is_ok());
        assert!(hooks.on_state_change(&SessionState::initial(Duration::ZERO)).is_ok());
    }

    #[test]
    fn completions_and_last_state() {
        let hooks = RecordingHooks::new();
        let mut state = SessionState::initial(Duration::from_secs(60));
        state.started_at = Some(chrono::Local::now());
        hooks.on_state_change(&state).unwrap();
        hooks.on_completed(&state.snapshot(), false).unwrap();

        assert_eq!(hooks.completions(), vec![(state.snapshot(), false)]);
        assert_eq!(hooks.last_state(), Some(state));
    }
}
