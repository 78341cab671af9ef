//! Shared utilities for focusd
//!
//! This crate provides:
//! - Time utilities (monotonic instants, mock-able wall clock, countdown formatting)
//! - Error types
//! - Default paths for config and data directories

mod error;
mod paths;
mod time;

pub use error::*;
pub use paths::*;
pub use time::*;
