//! Timer hook trait

use focus_api::{CompletedSession, SessionState, SessionType};
use std::time::Duration;
use thiserror::Error;

/// Errors a host may report from a hook
#[derive(Debug, Error)]
pub enum HookError {
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HookResult<T> = Result<T, HookError>;

/// Session lifecycle callbacks consumed by the host
///
/// Every method has an empty default so hosts only implement what they need.
/// Errors and panics are isolated by the engine: they are logged and the
/// state transition that triggered the hook completes regardless.
pub trait TimerHooks: Send + Sync {
    /// Fired after every mutation of the session state
    fn on_state_change(&self, _state: &SessionState) -> HookResult<()> {
        Ok(())
    }

    /// Fired at most once per tick while playing
    fn on_update(&self, _elapsed: Duration) -> HookResult<()> {
        Ok(())
    }

    /// Fired exactly once per finished session, before the transition.
    /// `manual` is set when the user skipped the session.
    fn on_completed(&self, _session: &CompletedSession, _manual: bool) -> HookResult<()> {
        Ok(())
    }

    fn on_paused(&self, _session_type: SessionType) -> HookResult<()> {
        Ok(())
    }

    fn on_resumed(&self, _session_type: SessionType) -> HookResult<()> {
        Ok(())
    }

    fn on_restarted(&self) -> HookResult<()> {
        Ok(())
    }

    /// Fired after a skip, once the machine has moved on from `skipped`
    fn on_skipped(&self, _skipped: SessionType) -> HookResult<()> {
        Ok(())
    }

    /// Progress discarded by a restart
    fn on_abandoned(&self, _session: &CompletedSession) -> HookResult<()> {
        Ok(())
    }
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl TimerHooks for NoopHooks {}
