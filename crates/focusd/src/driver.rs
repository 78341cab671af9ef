//! Tokio timer backing the engine's tick schedule

use focus_core::{TickSchedule, TickToken};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::trace;

/// Runs at most one interval, matching the engine's current schedule
#[derive(Default)]
pub struct TickDriver {
    current: Option<(TickToken, Interval)>,
}

impl TickDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token of the running interval, if any
    pub fn token(&self) -> Option<TickToken> {
        self.current.as_ref().map(|(token, _)| *token)
    }

    /// Follow the engine's schedule. The interval is only replaced when the
    /// token changes, so an unchanged schedule keeps its phase.
    pub fn sync(&mut self, schedule: Option<TickSchedule>) {
        match schedule {
            None => {
                if self.current.take().is_some() {
                    trace!("Tick interval cancelled");
                }
            }
            Some(schedule) if self.token() == Some(schedule.token) => {}
            Some(schedule) => {
                let mut interval = interval_at(Instant::now() + schedule.period, schedule.period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                trace!(
                    source = ?schedule.token.source(),
                    generation = schedule.token.generation(),
                    period_ms = schedule.period.as_millis() as u64,
                    "Tick interval armed"
                );
                self.current = Some((schedule.token, interval));
            }
        }
    }

    /// Wait for the next tick. Never resolves while no interval is armed.
    pub async fn tick(&mut self) -> TickToken {
        match self.current.as_mut() {
            Some((token, interval)) => {
                interval.tick().await;
                *token
            }
            None => std::future::pending().await,
        }
    }
}
