//! Focus timer engine

use focus_api::{QueuedSession, SessionState, SessionType, TickSourceKind, Visibility};
use focus_config::{ConfigResult, TimerConfig};
use focus_host_api::{HookResult, TimerHooks};
use focus_util::Result;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::{
    ClockReading, ClockSource, ElapsedTracker, SessionQueue, TickIntervals, TickOutcome,
    TickSchedule, TickToken, Transition,
};

/// The session state machine
///
/// Owns the live [`SessionState`] and the tracker measuring it. All
/// mutation goes through `&mut self`, so a host drives it from a single
/// event loop: commands and ticks in, hooks out.
pub struct TimerEngine {
    config: TimerConfig,
    state: SessionState,
    tracker: ElapsedTracker,
    queue: SessionQueue,
    /// The current focus duration came from the queue
    queued_focus: bool,
    visibility: Visibility,
    intervals: TickIntervals,
    hooks: Arc<dyn TimerHooks>,
    clock: Arc<dyn ClockSource>,
}

impl TimerEngine {
    /// Create an engine in a paused focus session
    pub fn new(
        config: TimerConfig,
        hooks: Arc<dyn TimerHooks>,
        clock: Arc<dyn ClockSource>,
    ) -> ConfigResult<Self> {
        config.validate()?;

        let state = SessionState::initial(config.focus_duration);
        info!(
            focus_secs = config.focus_duration.as_secs(),
            break_secs = config.break_duration.as_secs(),
            long_break_secs = config.long_break_duration.as_secs(),
            long_break_interval = config.long_break_interval,
            "Timer engine initialized"
        );

        Ok(Self {
            tracker: ElapsedTracker::new(state.duration),
            config,
            state,
            queue: SessionQueue::new(),
            queued_focus: false,
            visibility: Visibility::default(),
            intervals: TickIntervals::default(),
            hooks,
            clock,
        })
    }

    pub fn with_tick_intervals(mut self, intervals: TickIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn queue(&self) -> &[QueuedSession] {
        self.queue.entries()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn remaining(&self) -> Duration {
        self.state.remaining()
    }

    /// The timer the host should be running, if any
    pub fn tick_schedule(&self) -> Option<TickSchedule> {
        self.tracker.schedule(&self.intervals)
    }

    /// Start or resume the current session.
    ///
    /// A no-op while already playing.
    pub fn start(&mut self) {
        if self.state.is_playing {
            debug!("Start requested while already playing");
            return;
        }

        let now = self.clock.read();
        self.start_at(now);
    }

    /// Pause the current session, keeping its progress.
    ///
    /// A no-op while already paused.
    pub fn pause(&mut self) {
        if !self.state.is_playing {
            debug!("Pause requested while already paused");
            return;
        }

        let now = self.clock.read();
        self.state.elapsed = self.tracker.stop(now);
        self.state.is_playing = false;

        info!(
            session_type = %self.state.session_type,
            elapsed_secs = self.state.elapsed.as_secs(),
            "Session paused"
        );

        let session_type = self.state.session_type;
        self.dispatch("on_paused", |h| h.on_paused(session_type));
        self.emit_state();
    }

    /// Start when paused, pause when playing
    pub fn toggle(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Discard the progress of the current session.
    ///
    /// Type and iteration are kept; the session is left paused. Progress
    /// that is thrown away is reported through `on_abandoned` first.
    pub fn restart(&mut self) {
        let now = self.clock.read();
        self.state.elapsed = self.tracker.stop(now);

        if !self.state.elapsed.is_zero() {
            let abandoned = self.state.snapshot();
            self.dispatch("on_abandoned", |h| h.on_abandoned(&abandoned));
        }

        self.tracker.reset(now);
        self.state.elapsed = Duration::ZERO;
        self.state.started_at = None;
        self.state.is_playing = false;

        info!(
            session_type = %self.state.session_type,
            iteration = self.state.iteration,
            "Session restarted"
        );

        self.dispatch("on_restarted", |h| h.on_restarted());
        self.emit_state();
    }

    /// Complete the current session immediately and move to the next one.
    ///
    /// `manual` is passed to `on_completed` so the host can tell user skips
    /// from sessions that ran out.
    pub fn skip(&mut self, manual: bool) {
        let now = self.clock.read();
        self.state.elapsed = self.tracker.stop(now);
        let skipped = self.state.session_type;

        info!(
            session_type = %skipped,
            elapsed_secs = self.state.elapsed.as_secs(),
            manual,
            "Session skipped"
        );

        self.complete(manual, now);
        self.dispatch("on_skipped", |h| h.on_skipped(skipped));
    }

    /// Deliver a tick from the timer identified by `token`
    pub fn on_tick(&mut self, token: TickToken) -> TickOutcome {
        let now = self.clock.read();
        let outcome = self.tracker.tick(token, now);

        match outcome {
            TickOutcome::Ignored => {
                debug!(generation = token.generation(), "Stale tick ignored");
            }
            TickOutcome::Progress(elapsed) => {
                self.state.elapsed = elapsed;
                self.dispatch("on_update", |h| h.on_update(elapsed));
                self.emit_state();
            }
            TickOutcome::Completed(elapsed) => {
                self.state.elapsed = elapsed;
                self.dispatch("on_update", |h| h.on_update(elapsed));
                self.complete(false, now);
            }
        }

        outcome
    }

    /// Record host visibility, which selects the tick source
    pub fn set_visibility(&mut self, visibility: Visibility) {
        if visibility == self.visibility {
            return;
        }
        self.visibility = visibility;

        let source = TickSourceKind::from(visibility);
        debug!(?visibility, ?source, "Visibility changed");

        if self.state.is_playing {
            let now = self.clock.read();
            self.tracker.switch_source(source, now);
            self.state.elapsed = self.tracker.elapsed();
            self.emit_state();
        }
    }

    /// Replace the timer configuration.
    ///
    /// Invalid configurations are rejected and the previous one is kept.
    /// The active session's duration is resynced; if it drops below the
    /// elapsed time the session completes on its next tick, not here.
    pub fn update_config(&mut self, config: TimerConfig) -> ConfigResult<()> {
        if let Err(e) = config.validate() {
            warn!(error = %e, "Rejected timer configuration");
            return Err(e);
        }

        self.config = config;

        let keep_queued = self.state.session_type == SessionType::Focus && self.queued_focus;
        if !keep_queued {
            let duration = self.config.duration_for(self.state.session_type);
            self.tracker.set_duration(duration);
            self.state.duration = duration;
            self.state.elapsed = self.tracker.elapsed();
        }

        info!(
            session_type = %self.state.session_type,
            duration_secs = self.state.duration.as_secs(),
            "Timer configuration updated"
        );

        self.emit_state();
        Ok(())
    }

    /// Stop all timing so no tick schedule remains
    pub fn shutdown(&mut self) {
        if self.tracker.is_running() {
            let now = self.clock.read();
            self.state.elapsed = self.tracker.stop(now);
        }
        self.state.is_playing = false;
        info!(
            session_type = %self.state.session_type,
            elapsed_secs = self.state.elapsed.as_secs(),
            "Timer engine shut down"
        );
    }

    // Queue management

    pub fn enqueue(&mut self, duration: Duration, iterations: u32) -> Result<()> {
        self.queue.push(QueuedSession {
            duration,
            iterations,
        })?;
        debug!(
            duration_secs = duration.as_secs(),
            iterations,
            queue_len = self.queue.len(),
            "Session queued"
        );
        Ok(())
    }

    pub fn remove_queued(&mut self, index: usize) -> Result<QueuedSession> {
        self.queue.remove(index)
    }

    pub fn swap_queued(&mut self, index: usize, target: usize) -> Result<()> {
        self.queue.swap(index, target)
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    pub fn increment_queued_iterations(&mut self, index: usize) -> Result<u32> {
        self.queue.increment(index)
    }

    pub fn decrement_queued_iterations(&mut self, index: usize) -> Result<u32> {
        self.queue.decrement(index)
    }

    pub fn set_queued_duration(&mut self, index: usize, duration: Duration) -> Result<()> {
        self.queue.set_duration(index, duration)
    }

    fn start_at(&mut self, now: ClockReading) {
        if self.state.started_at.is_none() {
            self.state.started_at = Some(now.wall);
        }
        self.state.is_playing = true;
        self.tracker.start(self.visibility.into(), now);

        info!(
            session_type = %self.state.session_type,
            duration_secs = self.state.duration.as_secs(),
            elapsed_secs = self.state.elapsed.as_secs(),
            "Session started"
        );

        let session_type = self.state.session_type;
        self.dispatch("on_resumed", |h| h.on_resumed(session_type));
        self.emit_state();
    }

    /// Completion pipeline: report, count, pick the next session, reset,
    /// then auto-start if configured
    fn complete(&mut self, manual: bool, now: ClockReading) {
        let finished = self.state.snapshot();
        info!(
            session_type = %finished.session_type,
            elapsed_secs = finished.elapsed.as_secs(),
            iteration = finished.iteration,
            manual,
            "Session completed"
        );
        self.dispatch("on_completed", |h| h.on_completed(&finished, manual));

        let transition = Transition::after(&self.state, &self.config, &mut self.queue);
        self.state = transition.initial_state();
        self.queued_focus = transition.from_queue;
        self.tracker.set_duration(transition.duration);
        self.tracker.reset(now);

        info!(
            from = %transition.from,
            to = %transition.to,
            iteration = transition.iteration,
            duration_secs = transition.duration.as_secs(),
            from_queue = transition.from_queue,
            auto_start = transition.auto_start,
            "Session transition"
        );
        self.emit_state();

        if transition.auto_start {
            self.start_at(now);
        }
    }

    fn emit_state(&self) {
        self.dispatch("on_state_change", |h| h.on_state_change(&self.state));
    }

    /// Invoke a hook, isolating errors and panics from the engine
    fn dispatch<F>(&self, hook: &'static str, call: F)
    where
        F: FnOnce(&dyn TimerHooks) -> HookResult<()>,
    {
        let hooks = self.hooks.as_ref();
        match panic::catch_unwind(AssertUnwindSafe(|| call(hooks))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(hook, error = %e, "Timer hook failed"),
            Err(_) => error!(hook, "Timer hook panicked"),
        }
    }
}
