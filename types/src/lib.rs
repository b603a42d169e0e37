//! Shared configuration types for the wellness workout tracker
//!
//! This crate contains serializable configuration types that are shared between
//! the session engine (wellness-core) and its front ends (wellness-cli).

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Timer granularity used when no config file exists (matches a 100ms tick).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Lower bound so a hand-edited config can't spin the timer task.
pub const MIN_TICK_INTERVAL_MS: u64 = 10;

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding one workout file per day (`YYYY-MM-DD.toml`)
    #[serde(default)]
    pub workout_directory: String,

    /// How often a running countdown reports progress, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Start the countdown as soon as a timed exercise or rest is entered.
    /// When false, timers wait for an explicit play.
    #[serde(default)]
    pub auto_start_timers: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workout_directory: String::new(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            auto_start_timers: false,
        }
    }
}

impl AppConfig {
    /// Create a config pointing at the given workout directory, other fields default.
    pub fn with_workout_directory(workout_directory: impl Into<String>) -> Self {
        Self {
            workout_directory: workout_directory.into(),
            ..Self::default()
        }
    }

    /// Tick interval clamped to a sane minimum
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.max(MIN_TICK_INTERVAL_MS)
    }
}
