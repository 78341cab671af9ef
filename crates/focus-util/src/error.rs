//! Error types for focusd

use thiserror::Error;

/// Core error type for focusd operations
#[derive(Debug, Error)]
pub enum FocusError {
    #[error("Queue index {index} out of range (queue length {len})")]
    QueueIndexOutOfRange { index: usize, len: usize },

    #[error("Invalid queue entry: {0}")]
    InvalidQueueEntry(String),
}

impl FocusError {
    pub fn queue_index(index: usize, len: usize) -> Self {
        Self::QueueIndexOutOfRange { index, len }
    }

    pub fn invalid_queue_entry(msg: impl Into<String>) -> Self {
        Self::InvalidQueueEntry(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, FocusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_index_message() {
        let err = FocusError::queue_index(3, 2);
        assert_eq!(err.to_string(), "Queue index 3 out of range (queue length 2)");
    }
}
