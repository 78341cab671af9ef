//! focusd - a Pomodoro focus timer service
//!
//! The binary in `main.rs` is a thin wrapper around [`Service`]. The pieces
//! are public so integration tests can drive them without a terminal.

pub mod actions;
pub mod driver;
pub mod hooks;
pub mod messages;
pub mod service;

pub use actions::*;
pub use driver::*;
pub use hooks::*;
pub use service::*;
