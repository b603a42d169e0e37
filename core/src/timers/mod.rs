//! Timer system
//!
//! This module provides:
//! - **Countdown**: the single-slot cancellable countdown that drives timed
//!   exercises and rest periods
//! - **Formatting**: `m:ss` rendering of remaining time
//!
//! # Lifecycle
//!
//! 1. `Countdown::start` spawns a task and hands back a generation number
//! 2. The task emits `TimerEvent::Tick` until the deadline, then one `Finished`
//! 3. `cancel`/`pause` stop the task; stale events are filtered by `accept`

mod countdown;

pub use countdown::{Countdown, TimerEvent};

use std::time::Duration;

/// Render a remaining time as `m:ss`, truncating partial seconds
pub fn format_clock(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
