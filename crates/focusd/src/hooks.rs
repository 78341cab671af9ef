//! Daemon side of the timer hooks
//!
//! Persists finished focus sessions, appends audit events, runs user
//! scripts and sends desktop notifications.

use focus_api::{CompletedSession, SessionEndReason, SessionType, Visibility};
use focus_config::{Config, ScriptTrigger};
use focus_host_api::{HookError, HookResult, TimerHooks};
use focus_store::{AuditEvent, AuditEventType, SessionRecord, Store};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::actions::HostActions;
use crate::messages;

pub struct DaemonHooks {
    store: Arc<dyn Store>,
    actions: Arc<dyn HostActions>,
    config: Mutex<Config>,
    hidden: AtomicBool,
}

impl DaemonHooks {
    pub fn new(store: Arc<dyn Store>, actions: Arc<dyn HostActions>, config: Config) -> Self {
        let hidden = config.daemon.start_hidden;
        Self {
            store,
            actions,
            config: Mutex::new(config),
            hidden: AtomicBool::new(hidden),
        }
    }

    /// Replace the configuration used for scripts and notifications
    pub fn set_config(&self, config: Config) -> HookResult<()> {
        *self.config()? = config;
        Ok(())
    }

    /// Lifecycle notifications are only sent while the host is hidden
    pub fn set_visibility(&self, visibility: Visibility) {
        self.hidden
            .store(visibility == Visibility::Hidden, Ordering::SeqCst);
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn poison_config_lock(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.config.lock().unwrap();
            panic!("config lock poisoned on purpose");
        }));
    }

    fn config(&self) -> HookResult<MutexGuard<'_, Config>> {
        self.config
            .lock()
            .map_err(|_| HookError::Internal("Config lock poisoned".into()))
    }

    fn audit(&self, event: AuditEventType) -> HookResult<()> {
        self.store
            .append_audit(AuditEvent::new(event))
            .map_err(|e| HookError::Persistence(e.to_string()))
    }

    fn run_scripts(&self, trigger: ScriptTrigger) -> HookResult<()> {
        let config = self.config()?;
        for script in config.scripts_for(trigger) {
            debug!(script = %script.name, trigger = trigger.as_str(), "Triggering script");
            self.actions.run_script(script);
        }
        Ok(())
    }

    fn persist(&self, session: &CompletedSession, reason: SessionEndReason) -> HookResult<()> {
        if !session.is_persistable() {
            debug!(
                session_type = %session.session_type,
                elapsed_secs = session.elapsed.as_secs(),
                "Session too short to record"
            );
            return Ok(());
        }

        let Some(record) = SessionRecord::from_completed(session, reason, focus_util::now())
        else {
            return Ok(());
        };

        let record_id = self
            .store
            .record_session(&record)
            .map_err(|e| HookError::Persistence(e.to_string()))?;

        info!(
            record_id,
            reason = reason.as_str(),
            elapsed_secs = session.elapsed.as_secs(),
            "Focus session recorded"
        );

        self.audit(AuditEventType::SessionRecorded {
            record_id,
            reason,
            elapsed: session.elapsed,
        })
    }

    fn notify_completed(&self, session_type: SessionType, manual: bool) -> HookResult<()> {
        if manual {
            return Ok(());
        }
        let config = self.config()?;
        if config.timer.system_notifications {
            self.actions
                .notify(&messages::completed_message(session_type, &config.timer));
        }
        Ok(())
    }

    /// Pause and resume are only announced while the host is hidden
    fn notify_lifecycle(&self, message: impl FnOnce() -> String) -> HookResult<()> {
        if self.is_hidden() && self.config()?.timer.system_notifications {
            self.actions.notify(&message());
        }
        Ok(())
    }
}

/// Every step has already run; report the first failure after logging all of them
fn settle<const N: usize>(steps: [(&'static str, HookResult<()>); N]) -> HookResult<()> {
    let mut first = None;
    for (step, result) in steps {
        if let Err(e) = result {
            warn!(step, error = %e, "Hook step failed");
            first.get_or_insert(e);
        }
    }
    first.map_or(Ok(()), Err)
}

impl TimerHooks for DaemonHooks {
    fn on_completed(&self, session: &CompletedSession, manual: bool) -> HookResult<()> {
        let reason = if manual {
            SessionEndReason::Skipped
        } else {
            SessionEndReason::Completed
        };

        settle([
            (
                "audit",
                self.audit(AuditEventType::SessionCompleted {
                    session_type: session.session_type,
                    elapsed: session.elapsed,
                    manual,
                }),
            ),
            (
                "scripts",
                self.run_scripts(ScriptTrigger::end_of(session.session_type)),
            ),
            ("persist", self.persist(session, reason)),
            ("notify", self.notify_completed(session.session_type, manual)),
        ])
    }

    fn on_paused(&self, session_type: SessionType) -> HookResult<()> {
        settle([
            (
                "audit",
                self.audit(AuditEventType::SessionPaused { session_type }),
            ),
            (
                "scripts",
                self.run_scripts(ScriptTrigger::pause_of(session_type)),
            ),
            (
                "notify",
                self.notify_lifecycle(|| messages::paused_message(session_type)),
            ),
        ])
    }

    fn on_resumed(&self, session_type: SessionType) -> HookResult<()> {
        settle([
            (
                "audit",
                self.audit(AuditEventType::SessionResumed { session_type }),
            ),
            (
                "scripts",
                self.run_scripts(ScriptTrigger::start_of(session_type)),
            ),
            (
                "notify",
                self.notify_lifecycle(|| messages::resumed_message(session_type)),
            ),
        ])
    }

    fn on_restarted(&self) -> HookResult<()> {
        self.audit(AuditEventType::SessionRestarted)
    }

    fn on_skipped(&self, skipped: SessionType) -> HookResult<()> {
        self.audit(AuditEventType::SessionSkipped {
            session_type: skipped,
        })
    }

    fn on_abandoned(&self, session: &CompletedSession) -> HookResult<()> {
        self.persist(session, SessionEndReason::Restarted)
    }
}
