//! Shared data types for focusd
//!
//! This crate defines the types every other crate agrees on:
//! - Session types, live session state and completion snapshots
//! - Tick source and visibility selection
//! - The textual command grammar accepted by the daemon

mod commands;
mod types;

pub use commands::*;
pub use types::*;
