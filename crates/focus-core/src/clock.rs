//! Clock sources
//!
//! The tracker needs two readings at once: a monotonic instant for
//! per-frame deltas and a wall-clock time for the background fallback,
//! which must keep counting while the process is suspended.

use chrono::{DateTime, Local};
use focus_util::MonotonicInstant;
use std::sync::Mutex;
use std::time::Duration;

/// A paired monotonic and wall-clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub mono: MonotonicInstant,
    pub wall: DateTime<Local>,
}

/// Source of time for the engine
pub trait ClockSource: Send + Sync {
    fn read(&self) -> ClockReading;
}

/// The real clocks (respects `FOCUSD_MOCK_TIME` in debug builds)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn read(&self) -> ClockReading {
        ClockReading {
            mono: MonotonicInstant::now(),
            wall: focus_util::now(),
        }
    }
}

/// Manually driven clock for tests
///
/// Monotonic and wall time can be moved independently to simulate system
/// sleep (monotonic frozen, wall advancing) or a wall clock set backwards.
#[derive(Debug)]
pub struct ManualClock {
    reading: Mutex<ClockReading>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(focus_util::now())
    }

    pub fn starting_at(wall: DateTime<Local>) -> Self {
        Self {
            reading: Mutex::new(ClockReading {
                mono: MonotonicInstant::now(),
                wall,
            }),
        }
    }

    /// Advance both clocks
    pub fn advance(&self, d: Duration) {
        let mut reading = self.lock();
        reading.mono = reading.mono + d;
        reading.wall += wall_delta(d);
    }

    /// Advance only the wall clock, as during system sleep
    pub fn advance_wall(&self, d: Duration) {
        self.lock().wall += wall_delta(d);
    }

    /// Move the wall clock backwards, as after an NTP correction
    pub fn set_wall_back(&self, d: Duration) {
        self.lock().wall -= wall_delta(d);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClockReading> {
        self.reading
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for ManualClock {
    fn read(&self) -> ClockReading {
        *self.lock()
    }
}

fn wall_delta(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or_else(|_| chrono::Duration::zero())
}
