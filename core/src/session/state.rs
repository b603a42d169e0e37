//! Session state
//!
//! `SessionState` is the mutable position/mode/timer record owned by the
//! controller. `SessionSnapshot` is the read-only view published to
//! subscribers after every transition, with the display values a front end
//! needs (labels, progress, navigation availability) already derived.

use std::time::Duration;

use serde::Serialize;

use super::tracker::CompletionTracker;
use crate::exercise::{Exercise, ExerciseTarget};
use crate::timers::format_clock;

/// Fixed rest between sets
pub const REST_DURATION: Duration = Duration::from_secs(30);

/// What the session is doing right now. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionMode {
    /// Created, not started yet
    #[default]
    Idle,
    /// A timed exercise set is on screen
    ExerciseActive,
    /// A rep-based set is on screen, waiting for the rep count
    RepCounting,
    /// Resting between sets
    Resting,
    /// Every exercise has been passed; terminal
    Completed,
}

impl SessionMode {
    /// Modes where a countdown can run
    pub fn is_timed(&self) -> bool {
        matches!(self, SessionMode::ExerciseActive | SessionMode::Resting)
    }
}

/// A yes/no question the session is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Prompt {
    /// Fewer reps than the target were entered; proceed anyway?
    InsufficientReps { entered: u32, target: u32 },
    /// Leave the workout?
    ConfirmExit,
    /// The workout is finished; acknowledge to close the session
    WorkoutComplete,
}

impl Prompt {
    pub fn message(&self) -> String {
        match self {
            Prompt::InsufficientReps { entered, target } => format!(
                "Only {entered} of {target} reps entered. Count this set anyway?"
            ),
            Prompt::ConfirmExit => "Exit workout? Completed exercises stay saved.".to_string(),
            Prompt::WorkoutComplete => "Workout complete! Great job.".to_string(),
        }
    }
}

/// What was on screen when a command was issued.
///
/// The mode is part of the key: the rest before set `s` and set `s` itself
/// share an index and set number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SetPosition {
    pub exercise_index: usize,
    pub set: u32,
    pub mode: SessionMode,
}

/// Mutable session record owned by `SessionController`
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// In `[0, n]`; `n` means every exercise has been passed
    pub exercise_index: usize,
    /// 1-based, within `[1, sets]` while `exercise_index < n`
    pub current_set: u32,
    pub mode: SessionMode,
    pub is_timer_running: bool,
    pub remaining_time: Duration,
    pub total_time: Duration,
    /// Rep count typed in for the current set
    pub entered_reps: u32,
    pub completion: CompletionTracker,
    pub pending_prompt: Option<Prompt>,
    /// Re-entrancy guard for guarded transitions
    pub processing: bool,
    /// Set once the session should be torn down (exit confirmed or completion acknowledged)
    pub finished: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            current_set: 1,
            ..Self::default()
        }
    }

    pub fn position(&self) -> SetPosition {
        SetPosition {
            exercise_index: self.exercise_index,
            set: self.current_set,
            mode: self.mode,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Published view of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub exercise_index: usize,
    pub exercise_count: usize,
    pub current_set: u32,
    /// The exercise at `exercise_index`, absent once completed
    pub exercise: Option<Exercise>,
    pub entered_reps: u32,
    pub is_timer_running: bool,
    pub remaining_time: Duration,
    pub total_time: Duration,
    pub completed_sets: u32,
    pub all_sets_completed_properly: bool,
    pub pending_prompt: Option<Prompt>,
    pub processing: bool,
    pub finished: bool,
}

impl SessionSnapshot {
    pub fn from_state(state: &SessionState, exercises: &[Exercise]) -> Self {
        Self {
            mode: state.mode,
            exercise_index: state.exercise_index,
            exercise_count: exercises.len(),
            current_set: state.current_set,
            exercise: exercises.get(state.exercise_index).cloned(),
            entered_reps: state.entered_reps,
            is_timer_running: state.is_timer_running,
            remaining_time: state.remaining_time,
            total_time: state.total_time,
            completed_sets: state.completion.completed_sets(),
            all_sets_completed_properly: state.completion.all_sets_completed_properly(),
            pending_prompt: state.pending_prompt,
            processing: state.processing,
            finished: state.finished,
        }
    }

    pub fn position(&self) -> SetPosition {
        SetPosition {
            exercise_index: self.exercise_index,
            set: self.current_set,
            mode: self.mode,
        }
    }

    pub fn total_sets(&self) -> u32 {
        self.exercise.as_ref().map(|e| e.sets).unwrap_or(0)
    }

    /// Target reps for a rep-based exercise
    pub fn target_reps(&self) -> Option<u32> {
        match self.exercise.as_ref()?.target() {
            ExerciseTarget::Reps(reps) => Some(reps),
            ExerciseTarget::Duration(_) => None,
        }
    }

    /// Exercise-level progress, 0..=100
    pub fn progress_percent(&self) -> u32 {
        if self.exercise_count == 0 {
            return 100;
        }
        ((self.exercise_index.min(self.exercise_count) * 100) / self.exercise_count) as u32
    }

    /// "Exercise 2 of 5"
    pub fn progress_label(&self) -> String {
        let shown = (self.exercise_index + 1).min(self.exercise_count);
        format!("Exercise {} of {}", shown, self.exercise_count)
    }

    /// "Set 1 of 3"
    pub fn set_label(&self) -> String {
        format!("Set {} of {}", self.current_set, self.total_sets())
    }

    /// Remaining time as `m:ss`
    pub fn clock(&self) -> String {
        format_clock(self.remaining_time)
    }

    pub fn has_previous(&self) -> bool {
        self.exercise.is_some() && (self.exercise_index > 0 || self.current_set > 1)
    }

    pub fn has_next(&self) -> bool {
        self.exercise.is_some()
            && (self.exercise_index + 1 < self.exercise_count
                || self.current_set < self.total_sets())
    }
}
