//! Planned focus sessions
//!
//! Entries override the configured focus duration. Each time the machine
//! enters a focus session, the front entry supplies its duration and loses
//! one iteration; it is dropped once no iterations remain.

use focus_api::QueuedSession;
use focus_util::{FocusError, Result};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQueue {
    entries: Vec<QueuedSession>,
}

impl SessionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[QueuedSession] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: QueuedSession) -> Result<()> {
        check_duration(entry.duration)?;
        if entry.iterations == 0 {
            return Err(FocusError::invalid_queue_entry(
                "iterations must be at least 1",
            ));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<QueuedSession> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    pub fn swap(&mut self, index: usize, target: usize) -> Result<()> {
        self.check_index(index)?;
        self.check_index(target)?;
        self.entries.swap(index, target);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn increment(&mut self, index: usize) -> Result<u32> {
        let entry = self.get_mut(index)?;
        entry.iterations = entry.iterations.saturating_add(1);
        Ok(entry.iterations)
    }

    /// Remove one iteration, never going below one
    pub fn decrement(&mut self, index: usize) -> Result<u32> {
        let entry = self.get_mut(index)?;
        entry.iterations = entry.iterations.saturating_sub(1).max(1);
        Ok(entry.iterations)
    }

    pub fn set_duration(&mut self, index: usize, duration: Duration) -> Result<()> {
        check_duration(duration)?;
        self.get_mut(index)?.duration = duration;
        Ok(())
    }

    /// Consume one iteration of the front entry, returning its duration
    pub fn take_next(&mut self) -> Option<Duration> {
        let front = self.entries.first_mut()?;
        let duration = front.duration;
        front.iterations = front.iterations.saturating_sub(1);
        if front.iterations == 0 {
            self.entries.remove(0);
        }
        Some(duration)
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut QueuedSession> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(FocusError::queue_index(index, len))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(FocusError::queue_index(index, self.entries.len()))
        }
    }
}

fn check_duration(duration: Duration) -> Result<()> {
    if duration.is_zero() {
        Err(FocusError::invalid_queue_entry("duration must be greater than zero"))
    } else {
        Ok(())
    }
}
