//! Focus timer core for focusd
//!
//! This crate contains:
//! - Clock sources (real and manually driven)
//! - The elapsed-time tracker with its frame and fallback tick sources
//! - The session queue
//! - The session state machine (Focus -> Break / LongBreak -> Focus)
//!
//! It performs no I/O. Side effects are reported through
//! [`focus_host_api::TimerHooks`].

mod clock;
mod engine;
mod queue;
mod session;
mod tracker;

pub use clock::*;
pub use engine::*;
pub use queue::*;
pub use session::*;
pub use tracker::*;
