//! Workout session engine
//!
//! This module provides:
//! - **State**: position/mode/timer record and the published snapshot
//! - **Tracker**: per-set completion bookkeeping for the current exercise
//! - **Controller**: the state machine driving a user through the day's sets
//! - **Service**: a task that serialises commands and timer events into the controller
//!
//! # Architecture
//!
//! ```text
//!   front end ──SessionCommand──┐
//!                               ▼
//!                        SessionService (one task)
//!   Countdown ──TimerEvent──▶ │  SessionController
//!                               │      │
//!              watch<SessionSnapshot>  └──CompletionRequest──▶ completion writer ──▶ store
//! ```

mod controller;
mod error;
mod service;
mod state;
mod tracker;

#[cfg(test)]
mod controller_tests;

pub use controller::{SessionController, SessionOptions};
pub use error::SessionError;
pub use service::{SessionCommand, SessionHandle, SessionService};
pub use state::{Prompt, REST_DURATION, SessionMode, SessionSnapshot, SessionState, SetPosition};
pub use tracker::{CompletionTracker, SetOutcome};
