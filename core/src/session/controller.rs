//! Workout session state machine
//!
//! ```text
//! Idle ──start──▶ ExerciseActive | RepCounting ──complete_set──▶ Resting
//!                        ▲                                          │
//!                        └──────────── rest finished / skip ────────┘
//!                 last set of last exercise ──▶ Completed (terminal)
//! ```
//!
//! The controller is synchronous: every method runs one transition to
//! completion and publishes a snapshot. Serialisation with timer events is the
//! caller's job (see `SessionService`), which feeds both through one task.
//!
//! `complete_set` and `previous_set` take the `processing` guard. It is set
//! before any effect and cleared when the transition settles; a transition
//! waiting on a confirmation keeps it set, so a duplicate trigger arriving in
//! the meantime is dropped.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use super::state::{Prompt, REST_DURATION, SessionMode, SessionSnapshot, SessionState, SetPosition};
use super::tracker::SetOutcome;
use crate::exercise::{Exercise, ExerciseTarget, sort_for_session};
use crate::store::CompletionRequest;
use crate::timers::{Countdown, TimerEvent};

/// Knobs a session is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Countdown progress granularity
    pub tick: Duration,
    /// Start countdowns immediately instead of waiting for play
    pub auto_start_timers: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(wellness_types::DEFAULT_TICK_INTERVAL_MS),
            auto_start_timers: false,
        }
    }
}

impl From<&wellness_types::AppConfig> for SessionOptions {
    fn from(config: &wellness_types::AppConfig) -> Self {
        Self {
            tick: Duration::from_millis(config.tick_interval_ms()),
            auto_start_timers: config.auto_start_timers,
        }
    }
}

pub struct SessionController {
    exercises: Vec<Exercise>,
    state: SessionState,
    countdown: Countdown,
    options: SessionOptions,
    completions: mpsc::UnboundedSender<CompletionRequest>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    /// Create a controller over a day's exercises (sorted into session order here).
    ///
    /// Timer events are sent to `timer_events`; the owner must route them back
    /// into `handle_timer_event`. Completion writes go out on `completions`.
    pub fn new(
        exercises: Vec<Exercise>,
        options: SessionOptions,
        timer_events: mpsc::UnboundedSender<TimerEvent>,
        completions: mpsc::UnboundedSender<CompletionRequest>,
    ) -> Self {
        let exercises = sort_for_session(exercises);
        let state = SessionState::new();
        let (snapshots, _) = watch::channel(SessionSnapshot::from_state(&state, &exercises));

        Self {
            exercises,
            state,
            countdown: Countdown::new(options.tick, timer_events),
            options,
            completions,
            snapshots,
        }
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from_state(&self.state, &self.exercises)
    }

    /// Subscribe to snapshots published after every transition
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// True once the session should be torn down
    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Enter the first exercise, or complete immediately when there are none
    pub fn start(&mut self) {
        if self.state.mode != SessionMode::Idle {
            debug!(mode = ?self.state.mode, "start ignored: session already started");
            return;
        }

        info!(exercises = self.exercises.len(), "Workout session started");

        if self.exercises.is_empty() {
            // Nothing to acknowledge for an empty day
            self.state.mode = SessionMode::Completed;
            self.state.finished = true;
            info!("No exercises for this session, completing immediately");
        } else {
            self.state.exercise_index = 0;
            self.state.current_set = 1;
            self.start_exercise();
        }
        self.publish();
    }

    /// Ask to leave the session. Nothing is written on exit.
    pub fn request_exit(&mut self) {
        if self.state.finished {
            return;
        }
        if self.state.mode == SessionMode::Completed {
            // Already done, nothing to lose
            self.finish();
            self.publish();
            return;
        }

        self.dismiss_rep_prompt();
        self.state.pending_prompt = Some(Prompt::ConfirmExit);
        self.publish();
    }

    /// Answer the pending prompt
    pub fn answer(&mut self, yes: bool) {
        let Some(prompt) = self.state.pending_prompt.take() else {
            debug!(yes, "answer ignored: no prompt pending");
            return;
        };

        match prompt {
            Prompt::InsufficientReps { entered, target } => {
                if yes {
                    info!(entered, target, "Set counted despite insufficient reps");
                    self.finish_set(SetOutcome::Overridden);
                } else {
                    debug!("Insufficient reps declined, set not counted");
                    self.state.processing = false;
                }
            }
            Prompt::ConfirmExit => {
                if yes {
                    info!(position = ?self.state.position(), "Workout session exited");
                    self.finish();
                }
            }
            Prompt::WorkoutComplete => {
                if yes {
                    self.finish();
                } else {
                    self.state.pending_prompt = Some(Prompt::WorkoutComplete);
                }
            }
        }
        self.publish();
    }

    /// Screen went to the background: stop the countdown, keep the time left
    pub fn suspend(&mut self) {
        if self.state.is_timer_running {
            self.pause_timer();
            debug!(remaining_ms = self.state.remaining_time.as_millis() as u64, "Session suspended");
            self.publish();
        }
    }

    // ─── Set transitions ────────────────────────────────────────────────────

    /// Finish the current set (the "done" button, or a timed set running out)
    pub fn complete_set(&mut self) {
        if !self.is_in_exercise() {
            debug!(mode = ?self.state.mode, "complete_set ignored outside an exercise");
            return;
        }
        if self.state.processing {
            debug!(position = ?self.state.position(), "complete_set dropped: transition in flight");
            return;
        }
        self.state.processing = true;
        self.stop_timer();

        // Timed sets never fall short
        let short_of = match self.current_exercise().target() {
            ExerciseTarget::Reps(target) if self.state.entered_reps < target => Some(target),
            ExerciseTarget::Reps(_) | ExerciseTarget::Duration(_) => None,
        };

        match (short_of, self.state.pending_prompt) {
            (None, _) => self.finish_set(SetOutcome::Completed),
            (Some(target), None) => {
                self.state.pending_prompt = Some(Prompt::InsufficientReps {
                    entered: self.state.entered_reps,
                    target,
                });
            }
            (Some(_), Some(_)) => {
                debug!("complete_set dropped: another prompt is pending");
                self.state.processing = false;
            }
        }
        self.publish();
    }

    /// `complete_set`, but only if the session is still at `at`.
    ///
    /// Front ends pass the position they were showing so a press that raced a
    /// timer finish (and now refers to a set or rest that is over) is dropped.
    pub fn complete_set_at(&mut self, at: SetPosition) {
        if self.state.position() != at {
            debug!(expected = ?at, actual = ?self.state.position(), "complete_set dropped: stale position");
            return;
        }
        self.complete_set();
    }

    /// Leave the rest period early and start the next set
    pub fn skip_rest(&mut self) {
        if self.state.mode != SessionMode::Resting {
            return;
        }
        self.stop_timer();
        self.start_exercise();
        self.publish();
    }

    /// Manual forward navigation. Records nothing, so an exercise skipped this
    /// way is never marked complete.
    pub fn next_set(&mut self) {
        if !self.is_active() {
            return;
        }
        self.dismiss_rep_prompt();
        self.stop_timer();

        let sets = self.current_exercise().sets;
        if self.state.current_set < sets {
            self.state.current_set += 1;
            self.start_rest();
        } else {
            // Skipped, so nothing is carried into the next exercise or Completed
            self.state.completion.reset(0);
            self.state.current_set = 1;
            self.advance_exercise();
        }
        self.publish();
    }

    /// Manual backward navigation
    pub fn previous_set(&mut self) {
        if !self.is_active() {
            return;
        }
        if self.state.processing {
            debug!(position = ?self.state.position(), "previous_set dropped: transition in flight");
            return;
        }

        let resting = self.state.mode == SessionMode::Resting;
        let index = self.state.exercise_index;
        let set = self.state.current_set;
        if !resting && set == 1 && index == 0 {
            return;
        }

        self.state.processing = true;
        self.stop_timer();

        if resting {
            if set > 1 {
                self.state.current_set = set - 1;
            } else if index > 0 {
                self.enter_previous_exercise();
            } else {
                self.state.current_set = 1;
            }
        } else if set > 1 {
            self.state.current_set = set - 1;
            self.state.completion.clear(set - 1);
        } else {
            self.enter_previous_exercise();
        }

        self.start_exercise();
        self.state.processing = false;
        self.publish();
    }

    // ─── Timer ──────────────────────────────────────────────────────────────

    /// Play/pause for a timed exercise or rest. Resuming continues from the
    /// preserved remaining time.
    pub fn toggle_pause_resume(&mut self) {
        if !self.state.mode.is_timed() || self.state.pending_prompt.is_some() {
            return;
        }

        if self.state.is_timer_running {
            self.pause_timer();
        } else if !self.state.remaining_time.is_zero() {
            self.run_timer();
        }
        self.publish();
    }

    /// Route an event from the countdown channel
    pub fn handle_timer_event(&mut self, event: TimerEvent) {
        if !self.countdown.accept(&event) {
            debug!(generation = event.generation(), "Stale timer event dropped");
            return;
        }

        match event {
            TimerEvent::Tick { remaining, .. } => {
                self.state.remaining_time = remaining;
                self.publish();
            }
            TimerEvent::Finished { .. } => {
                self.state.is_timer_running = false;
                self.state.remaining_time = Duration::ZERO;
                match self.state.mode {
                    SessionMode::ExerciseActive => self.complete_set(),
                    SessionMode::Resting => {
                        debug!(set = self.state.current_set, "Rest finished");
                        self.start_exercise();
                        self.publish();
                    }
                    _ => self.publish(),
                }
            }
        }
    }

    // ─── Rep counter ────────────────────────────────────────────────────────

    /// Set the rep count from free text; anything unparsable counts as 0
    pub fn set_reps(&mut self, text: &str) {
        if self.state.mode != SessionMode::RepCounting {
            return;
        }
        self.state.entered_reps = text.trim().parse().unwrap_or(0);
        self.publish();
    }

    pub fn increment_reps(&mut self) {
        if self.state.mode != SessionMode::RepCounting {
            return;
        }
        self.state.entered_reps = self.state.entered_reps.saturating_add(1);
        self.publish();
    }

    pub fn decrement_reps(&mut self) {
        if self.state.mode != SessionMode::RepCounting {
            return;
        }
        self.state.entered_reps = self.state.entered_reps.saturating_sub(1);
        self.publish();
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    /// Out-of-range indexing here is a bug, not a user error
    fn current_exercise(&self) -> &Exercise {
        &self.exercises[self.state.exercise_index]
    }

    fn is_active(&self) -> bool {
        !matches!(self.state.mode, SessionMode::Idle | SessionMode::Completed) && !self.state.finished
    }

    fn is_in_exercise(&self) -> bool {
        matches!(
            self.state.mode,
            SessionMode::ExerciseActive | SessionMode::RepCounting
        ) && !self.state.finished
    }

    /// Enter the set at the current position. Tracking starts over at set 1.
    fn start_exercise(&mut self) {
        self.stop_timer();
        let exercise = self.current_exercise();
        let sets = exercise.sets;
        let target = exercise.target();

        debug!(
            exercise_id = exercise.id,
            name = %exercise.name,
            set = self.state.current_set,
            sets,
            "Entering exercise set"
        );

        if self.state.current_set == 1 {
            self.state.completion.reset(sets);
        }

        match target {
            ExerciseTarget::Duration(duration) => {
                self.state.mode = SessionMode::ExerciseActive;
                self.state.remaining_time = duration;
                self.state.total_time = duration;
                if self.options.auto_start_timers {
                    self.run_timer();
                }
            }
            ExerciseTarget::Reps(_) => {
                self.state.mode = SessionMode::RepCounting;
                self.state.entered_reps = 0;
                self.state.remaining_time = Duration::ZERO;
                self.state.total_time = Duration::ZERO;
            }
        }
    }

    fn start_rest(&mut self) {
        self.stop_timer();
        self.state.mode = SessionMode::Resting;
        self.state.remaining_time = REST_DURATION;
        self.state.total_time = REST_DURATION;
        debug!(next_set = self.state.current_set, "Resting");
        if self.options.auto_start_timers {
            self.run_timer();
        }
    }

    /// Record the set and move on: rest before the next set, or past the exercise
    fn finish_set(&mut self, outcome: SetOutcome) {
        let set = self.state.current_set;
        let exercise = self.current_exercise();
        let (id, sets) = (exercise.id, exercise.sets);

        self.state.completion.record(set, outcome);
        debug!(exercise_id = id, set, sets, ?outcome, "Set finished");

        if set < sets {
            self.state.current_set += 1;
            self.start_rest();
        } else {
            if self.state.completion.should_mark_complete(sets) {
                self.request_completion(id);
            } else {
                debug!(
                    exercise_id = id,
                    completed_sets = self.state.completion.completed_sets(),
                    proper = self.state.completion.all_sets_completed_properly(),
                    "Exercise passed without completion"
                );
            }
            self.state.completion.reset(0);
            self.state.current_set = 1;
            self.advance_exercise();
        }
        self.state.processing = false;
    }

    /// Move past the current exercise (current_set already reset by caller)
    fn advance_exercise(&mut self) {
        self.state.exercise_index += 1;
        if self.state.exercise_index >= self.exercises.len() {
            self.state.exercise_index = self.exercises.len();
            self.enter_completed();
        } else {
            self.start_exercise();
        }
    }

    /// Step back to the last set of the previous exercise with fresh tracking
    fn enter_previous_exercise(&mut self) {
        self.state.exercise_index -= 1;
        let sets = self.current_exercise().sets;
        self.state.current_set = sets;
        self.state.completion.reset(sets);
    }

    fn enter_completed(&mut self) {
        if self.state.mode == SessionMode::Completed {
            return;
        }
        self.stop_timer();
        self.state.mode = SessionMode::Completed;
        self.state.remaining_time = Duration::ZERO;
        self.state.total_time = Duration::ZERO;
        self.state.pending_prompt = Some(Prompt::WorkoutComplete);
        info!(exercises = self.exercises.len(), "Workout completed");
    }

    fn finish(&mut self) {
        self.stop_timer();
        self.state.pending_prompt = None;
        self.state.processing = false;
        self.state.finished = true;
    }

    /// A pending rep confirmation is declined when navigation moves away from its set
    fn dismiss_rep_prompt(&mut self) {
        if matches!(self.state.pending_prompt, Some(Prompt::InsufficientReps { .. })) {
            debug!("Pending rep confirmation dismissed");
            self.state.pending_prompt = None;
            self.state.processing = false;
        }
    }

    fn run_timer(&mut self) {
        self.countdown.start(self.state.remaining_time);
        self.state.is_timer_running = true;
    }

    fn pause_timer(&mut self) {
        if let Some(remaining) = self.countdown.pause() {
            self.state.remaining_time = remaining;
        }
        self.state.is_timer_running = false;
    }

    fn stop_timer(&mut self) {
        self.countdown.cancel();
        self.state.is_timer_running = false;
    }

    /// Fire-and-forget: the writer task applies it to the store
    fn request_completion(&self, exercise_id: i64) {
        info!(exercise_id, "Exercise completed, marking in store");
        if self.completions.send(CompletionRequest { exercise_id }).is_err() {
            error!(exercise_id, "Completion writer is gone, completion not recorded");
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}
