//! Elapsed-time tracker
//!
//! Accumulates elapsed time for one session from one of two interchangeable
//! tick sources:
//!
//! - [`TickSourceKind::Frame`]: frequent ticks while the host is visible;
//!   each tick adds the monotonic delta since the previous one.
//! - [`TickSourceKind::Fallback`]: infrequent ticks while hidden; each tick
//!   recomputes elapsed from the wall clock, so time spent suspended or
//!   throttled is still counted.
//!
//! Every activation of a source is identified by a [`TickToken`]. Only the
//! token of the current activation is honoured, so a tick delivered after
//! a stop, reset, source switch or completion is ignored.

use chrono::{DateTime, Local};
use focus_api::TickSourceKind;
use focus_util::MonotonicInstant;
use std::time::Duration;
use tracing::debug;

use crate::ClockReading;

/// Identifies one activation of one tick source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken {
    generation: u64,
    source: TickSourceKind,
}

impl TickToken {
    pub fn source(&self) -> TickSourceKind {
        self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Tick periods for each source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickIntervals {
    pub frame: Duration,
    pub fallback: Duration,
}

impl TickIntervals {
    pub fn period_for(&self, source: TickSourceKind) -> Duration {
        match source {
            TickSourceKind::Frame => self.frame,
            TickSourceKind::Fallback => self.fallback,
        }
    }
}

impl Default for TickIntervals {
    fn default() -> Self {
        Self {
            frame: Duration::from_millis(100),
            fallback: Duration::from_millis(250),
        }
    }
}

/// The timer a host should currently be running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    pub token: TickToken,
    pub period: Duration,
}

/// Result of delivering a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale or unknown token; nothing changed
    Ignored,
    /// Elapsed advanced (or held) below the duration
    Progress(Duration),
    /// Elapsed reached the duration; the source is now inactive
    Completed(Duration),
}

#[derive(Debug, Clone, Copy)]
struct Activation {
    token: TickToken,
    /// Monotonic time the last delta was folded at
    last_mono: MonotonicInstant,
    /// Wall time at which elapsed would have been zero
    wall_anchor: DateTime<Local>,
}

/// Elapsed time for a single session
#[derive(Debug)]
pub struct ElapsedTracker {
    duration: Duration,
    elapsed: Duration,
    generation: u64,
    active: Option<Activation>,
}

impl ElapsedTracker {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            generation: 0,
            active: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_token(&self) -> Option<TickToken> {
        self.active.map(|a| a.token)
    }

    pub fn schedule(&self, intervals: &TickIntervals) -> Option<TickSchedule> {
        self.active.map(|a| TickSchedule {
            token: a.token,
            period: intervals.period_for(a.token.source),
        })
    }

    /// Begin accumulating on `source`.
    ///
    /// Idempotent: while already running, the current token is returned and
    /// nothing changes.
    pub fn start(&mut self, source: TickSourceKind, now: ClockReading) -> TickToken {
        if let Some(active) = &self.active {
            return active.token;
        }
        self.activate(source, now)
    }

    /// Stop accumulating, folding the time since the last tick.
    ///
    /// Never reports completion; a session that ran out between ticks is
    /// completed by the next tick after it is started again.
    pub fn stop(&mut self, now: ClockReading) -> Duration {
        if let Some(active) = self.active.take() {
            self.elapsed = self.fold(&active, now).min(self.duration);
            self.bump();
        }
        self.elapsed
    }

    /// Zero elapsed time. A running tracker restarts its source from zero.
    pub fn reset(&mut self, now: ClockReading) -> Option<TickToken> {
        self.elapsed = Duration::ZERO;
        let source = self.active.take()?.token.source;
        Some(self.activate(source, now))
    }

    /// Move to another source without losing or double-counting time.
    ///
    /// Time up to `now` is folded with the outgoing strategy (wall-clock
    /// catch-up when leaving the fallback) before the new source takes over.
    /// Returns the new token, or `None` when not running.
    pub fn switch_source(&mut self, source: TickSourceKind, now: ClockReading) -> Option<TickToken> {
        let active = self.active?;
        if active.token.source == source {
            return Some(active.token);
        }

        self.elapsed = self.fold(&active, now).min(self.duration);
        debug!(
            from = ?active.token.source,
            to = ?source,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "Tick source switched"
        );
        Some(self.activate(source, now))
    }

    /// Deliver a tick from the source identified by `token`
    pub fn tick(&mut self, token: TickToken, now: ClockReading) -> TickOutcome {
        let Some(mut active) = self.active else {
            return TickOutcome::Ignored;
        };
        if active.token != token {
            return TickOutcome::Ignored;
        }

        let candidate = self.fold(&active, now);
        if candidate >= self.duration {
            self.elapsed = self.duration;
            self.active = None;
            self.bump();
            return TickOutcome::Completed(self.elapsed);
        }

        self.elapsed = candidate;
        active.last_mono = now.mono;
        if token.source == TickSourceKind::Fallback {
            active.wall_anchor = rebase_anchor(active.wall_anchor, self.elapsed, now.wall);
        }
        self.active = Some(active);
        TickOutcome::Progress(self.elapsed)
    }

    /// Change the target duration. Elapsed is clamped but never completed
    /// here; completion waits for the next tick.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
        self.elapsed = self.elapsed.min(duration);
    }

    fn activate(&mut self, source: TickSourceKind, now: ClockReading) -> TickToken {
        self.bump();
        let token = TickToken {
            generation: self.generation,
            source,
        };
        self.active = Some(Activation {
            token,
            last_mono: now.mono,
            wall_anchor: now.wall - to_chrono(self.elapsed),
        });
        token
    }

    /// Candidate elapsed at `now` for the given activation; never below the
    /// last reported value
    fn fold(&self, active: &Activation, now: ClockReading) -> Duration {
        let candidate = match active.token.source {
            TickSourceKind::Frame => self.elapsed + now.mono.duration_since(active.last_mono),
            TickSourceKind::Fallback => (now.wall - active.wall_anchor)
                .to_std()
                .unwrap_or(Duration::ZERO),
        };
        candidate.max(self.elapsed)
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Keep `anchor + elapsed <= wall` so a wall clock set backwards resumes
/// counting from the current value instead of stalling until it catches up.
fn rebase_anchor(
    anchor: DateTime<Local>,
    elapsed: Duration,
    wall: DateTime<Local>,
) -> DateTime<Local> {
    let rebased = wall - to_chrono(elapsed);
    if rebased < anchor {
        debug!("Wall clock moved backwards, re-anchoring");
        rebased
    } else {
        anchor
    }
}

fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or_else(|_| chrono::Duration::zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClockSource, ManualClock};

    const SECOND: Duration = Duration::from_secs(1);

    fn setup(duration_secs: u64) -> (ElapsedTracker, ManualClock) {
        (
            ElapsedTracker::new(Duration::from_secs(duration_secs)),
            ManualClock::new(),
        )
    }

    #[test]
    fn frame_ticks_accumulate_monotonic_deltas() {
        let (mut tracker, clock) = setup(60);
        let token = tracker.start(TickSourceKind::Frame, clock.read());

        clock.advance(SECOND);
        assert_eq!(tracker.tick(token, clock.read()), TickOutcome::Progress(SECOND));
        clock.advance(SECOND * 2);
        assert_eq!(
            tracker.tick(token, clock.read()),
            TickOutcome::Progress(SECOND * 3)
        );
    }

    #[test]
    fn frame_ignores_wall_clock_jumps() {
        let (mut tracker, clock) = setup(60);
        let token = tracker.start(TickSourceKind::Frame, clock.read());

        clock.advance_wall(Duration::from_secs(3600));
        clock.advance(SECOND);
        assert_eq!(tracker.tick(token, clock.read()), TickOutcome::Progress(SECOND));
    }

    #[test]
    fn fallback_counts_time_spent_suspended() {
        let (mut tracker, clock) = setup(1500);
        let token = tracker.start(TickSourceKind::Fallback, clock.read());

        clock.advance_wall(Duration::from_secs(600));
        assert_eq!(
            tracker.tick(token, clock.read()),
            TickOutcome::Progress(Duration::from_secs(600))
        );
    }

    #[test]
    fn fallback_survives_wall_clock_going_back() {
        let (mut tracker, clock) = setup(60);
        let token = tracker.start(TickSourceKind::Fallback, clock.read());

        clock.advance(SECOND * 10);
        assert_eq!(
            tracker.tick(token, clock.read()),
            TickOutcome::Progress(SECOND * 10)
        );

        clock.set_wall_back(Duration::from_secs(30));
        assert_eq!(
            tracker.tick(token, clock.read()),
            TickOutcome::Progress(SECOND * 10)
        );

        // Counting resumes from the held value rather than waiting 30s
        clock.advance(SECOND * 2);
        assert_eq!(
            tracker.tick(token, clock.read()),
            TickOutcome::Progress(SECOND * 12)
        );
    }

    #[test]
    fn completes_exactly_once() {
        let (mut tracker, clock) = setup(5);
        let token = tracker.start(TickSourceKind::Frame, clock.read());

        clock.advance(SECOND * 10);
        assert_eq!(
            tracker.tick(token, clock.read()),
            TickOutcome::Completed(SECOND * 5)
        );
        assert!(!tracker.is_running());

        // A racing tick carrying the same token is dropped
        clock.advance(SECOND);
        assert_eq!(tracker.tick(token, clock.read()), TickOutcome::Ignored);
        assert_eq!(tracker.elapsed(), SECOND * 5);
    }

    #[test]
    fn zero_duration_completes_on_next_tick() {
        let (mut tracker, clock) = setup(0);
        let token = tracker.start(TickSourceKind::Frame, clock.read());
        assert_eq!(
            tracker.tick(token, clock.read()),
            TickOutcome::Completed(Duration::ZERO)
        );
    }

    #[test]
    fn start_is_idempotent() {
        let (mut tracker, clock) = setup(60);
        let first = tracker.start(TickSourceKind::Frame, clock.read());
        clock.advance(SECOND);
        let second = tracker.start(TickSourceKind::Fallback, clock.read());

        assert_eq!(first, second);
        assert_eq!(tracker.active_token(), Some(first));
        assert_eq!(tracker.tick(first, clock.read()), TickOutcome::Progress(SECOND));
    }

    #[test]
    fn stop_folds_partial_delta_and_invalidates_token() {
        let (mut tracker, clock) = setup(60);
        let token = tracker.start(TickSourceKind::Frame, clock.read());

        clock.advance(Duration::from_millis(1500));
        assert_eq!(tracker.stop(clock.read()), Duration::from_millis(1500));
        assert!(!tracker.is_running());
        assert!(tracker.schedule(&TickIntervals::default()).is_none());

        clock.advance(SECOND);
        assert_eq!(tracker.tick(token, clock.read()), TickOutcome::Ignored);
        assert_eq!(tracker.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn stop_past_duration_clamps_without_completing() {
        let (mut tracker, clock) = setup(5);
        tracker.start(TickSourceKind::Frame, clock.read());
        clock.advance(SECOND * 9);
        assert_eq!(tracker.stop(clock.read()), SECOND * 5);

        // Completion is delivered once the session runs again
        let token = tracker.start(TickSourceKind::Frame, clock.read());
        assert_eq!(
            tracker.tick(token, clock.read()),
            TickOutcome::Completed(SECOND * 5)
        );
    }

    #[test]
    fn resume_after_stop_does_not_count_paused_time() {
        let (mut tracker, clock) = setup(60);
        tracker.start(TickSourceKind::Fallback, clock.read());
        clock.advance(SECOND * 10);
        tracker.stop(clock.read());

        clock.advance(Duration::from_secs(300));
        let token = tracker.start(TickSourceKind::Fallback, clock.read());
        clock.advance(SECOND);
        assert_eq!(
            tracker.tick(token, clock.read()),
            TickOutcome::Progress(SECOND * 11)
        );
    }

    #[test]
    fn reset_restarts_running_source_from_zero() {
        let (mut tracker, clock) = setup(60);
        let old = tracker.start(TickSourceKind::Frame, clock.read());
        clock.advance(SECOND * 20);
        tracker.tick(old, clock.read());

        let new = tracker.reset(clock.read()).unwrap();
        assert_ne!(old, new);
        assert_eq!(tracker.elapsed(), Duration::ZERO);
        assert_eq!(tracker.tick(old, clock.read()), TickOutcome::Ignored);

        clock.advance(SECOND);
        assert_eq!(tracker.tick(new, clock.read()), TickOutcome::Progress(SECOND));
    }

    #[test]
    fn reset_while_stopped_stays_stopped() {
        let (mut tracker, clock) = setup(60);
        tracker.start(TickSourceKind::Frame, clock.read());
        clock.advance(SECOND * 3);
        tracker.stop(clock.read());

        assert_eq!(tracker.reset(clock.read()), None);
        assert_eq!(tracker.elapsed(), Duration::ZERO);
        assert!(!tracker.is_running());
    }

    #[test]
    fn sources_are_never_active_together() {
        let (mut tracker, clock) = setup(600);
        let frame = tracker.start(TickSourceKind::Frame, clock.read());
        let fallback = tracker
            .switch_source(TickSourceKind::Fallback, clock.read())
            .unwrap();

        // Racing ticks from the old source are dropped after the switch
        clock.advance(SECOND);
        assert_eq!(tracker.tick(frame, clock.read()), TickOutcome::Ignored);
        assert_eq!(
            tracker.tick(fallback, clock.read()),
            TickOutcome::Progress(SECOND)
        );

        let frame_again = tracker
            .switch_source(TickSourceKind::Frame, clock.read())
            .unwrap();
        assert_eq!(tracker.tick(fallback, clock.read()), TickOutcome::Ignored);
        assert_eq!(tracker.active_token(), Some(frame_again));
        assert_eq!(frame_again.source(), TickSourceKind::Frame);
    }

    #[test]
    fn switching_catches_up_without_double_counting() {
        let (mut tracker, clock) = setup(1500);
        let frame = tracker.start(TickSourceKind::Frame, clock.read());
        clock.advance(SECOND * 10);
        tracker.tick(frame, clock.read());

        // Hidden: 4 seconds of frame time not yet folded, then a long sleep
        clock.advance(SECOND * 4);
        let fallback = tracker
            .switch_source(TickSourceKind::Fallback, clock.read())
            .unwrap();
        assert_eq!(tracker.elapsed(), SECOND * 14);

        clock.advance_wall(Duration::from_secs(100));
        assert_eq!(
            tracker.tick(fallback, clock.read()),
            TickOutcome::Progress(SECOND * 114)
        );

        // Visible again: catch-up folded, monotonic time frozen during sleep
        // adds nothing more
        clock.advance_wall(SECOND * 6);
        let frame = tracker
            .switch_source(TickSourceKind::Frame, clock.read())
            .unwrap();
        assert_eq!(tracker.elapsed(), SECOND * 120);
        clock.advance(SECOND);
        assert_eq!(
            tracker.tick(frame, clock.read()),
            TickOutcome::Progress(SECOND * 121)
        );
    }

    #[test]
    fn switching_never_regresses() {
        let (mut tracker, clock) = setup(600);
        let frame = tracker.start(TickSourceKind::Frame, clock.read());
        clock.advance(SECOND * 30);
        tracker.tick(frame, clock.read());

        clock.set_wall_back(Duration::from_secs(120));
        let fallback = tracker
            .switch_source(TickSourceKind::Fallback, clock.read())
            .unwrap();
        assert_eq!(tracker.elapsed(), SECOND * 30);
        assert_eq!(
            tracker.tick(fallback, clock.read()),
            TickOutcome::Progress(SECOND * 30)
        );

        clock.set_wall_back(Duration::from_secs(120));
        tracker.switch_source(TickSourceKind::Frame, clock.read());
        assert_eq!(tracker.elapsed(), SECOND * 30);
    }

    #[test]
    fn switch_to_same_source_keeps_token() {
        let (mut tracker, clock) = setup(60);
        let token = tracker.start(TickSourceKind::Fallback, clock.read());
        assert_eq!(
            tracker.switch_source(TickSourceKind::Fallback, clock.read()),
            Some(token)
        );
    }

    #[test]
    fn switch_while_stopped_is_noop() {
        let (mut tracker, clock) = setup(60);
        assert_eq!(tracker.switch_source(TickSourceKind::Frame, clock.read()), None);
        assert!(!tracker.is_running());
    }

    #[test]
    fn set_duration_clamps_without_completing() {
        let (mut tracker, clock) = setup(60);
        let token = tracker.start(TickSourceKind::Frame, clock.read());
        clock.advance(SECOND * 40);
        tracker.tick(token, clock.read());

        tracker.set_duration(SECOND * 30);
        assert_eq!(tracker.elapsed(), SECOND * 30);
        assert!(tracker.is_running());

        assert_eq!(
            tracker.tick(token, clock.read()),
            TickOutcome::Completed(SECOND * 30)
        );
    }

    #[test]
    fn schedule_reports_period_for_active_source() {
        let (mut tracker, clock) = setup(60);
        let intervals = TickIntervals::default();
        let token = tracker.start(TickSourceKind::Fallback, clock.read());

        assert_eq!(
            tracker.schedule(&intervals),
            Some(TickSchedule {
                token,
                period: Duration::from_millis(250),
            })
        );
    }
}
