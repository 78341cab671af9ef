//! Hook interface between the focus timer core and its host
//!
//! The engine reports every lifecycle event through [`TimerHooks`]. Hosts
//! implement it to persist sessions, dispatch notifications and run user
//! scripts. The engine never awaits or retries a hook.

mod hooks;
mod mock;

pub use hooks::*;
pub use mock::*;
