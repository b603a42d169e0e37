//! Tests for SessionController transitions
//!
//! Verifies that:
//! - Sets, rests and exercises advance in the right order
//! - Completion is written exactly when every set was completed properly
//! - The processing guard and stale-event filtering resolve races to one transition
//! - Timers pause and resume without losing time

use std::time::Duration;

use tokio::sync::mpsc;

use super::{
    Prompt, REST_DURATION, SessionController, SessionMode, SessionOptions, SessionSnapshot,
    SetPosition,
};
use crate::exercise::{Category, Exercise};
use crate::store::CompletionRequest;
use crate::timers::TimerEvent;

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

struct Harness {
    controller: SessionController,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
    completion_rx: mpsc::UnboundedReceiver<CompletionRequest>,
}

impl Harness {
    fn new(exercises: Vec<Exercise>) -> Self {
        Self::with_options(exercises, SessionOptions::default())
    }

    fn with_options(exercises: Vec<Exercise>, options: SessionOptions) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            controller: SessionController::new(exercises, options, timer_tx, completion_tx),
            timer_rx,
            completion_rx,
        }
    }

    fn started(exercises: Vec<Exercise>) -> Self {
        let mut harness = Self::new(exercises);
        harness.controller.start();
        harness
    }

    /// Feed every queued timer event into the controller
    fn pump(&mut self) {
        while let Ok(event) = self.timer_rx.try_recv() {
            self.controller.handle_timer_event(event);
        }
    }

    /// Exercise ids written to the store so far
    fn completions(&mut self) -> Vec<i64> {
        let mut ids = Vec::new();
        while let Ok(request) = self.completion_rx.try_recv() {
            ids.push(request.exercise_id);
        }
        ids
    }

    fn snap(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    fn mode(&self) -> SessionMode {
        self.controller.state().mode
    }

    fn position(&self) -> (usize, u32) {
        let state = self.controller.state();
        (state.exercise_index, state.current_set)
    }

    fn completed_sets(&self) -> u32 {
        self.controller.state().completion.completed_sets()
    }

    fn proper(&self) -> bool {
        self.controller.state().completion.all_sets_completed_properly()
    }

    /// Enter reps and press done
    fn do_reps(&mut self, reps: &str) {
        self.controller.set_reps(reps);
        self.controller.complete_set();
    }
}

fn timed(id: i64, sets: u32, secs: u32) -> Exercise {
    Exercise::timed(id, &format!("timed{id}"), Category::Workout, sets, secs)
}

fn reps(id: i64, sets: u32, target: u32) -> Exercise {
    Exercise::with_reps(id, &format!("reps{id}"), Category::Workout, sets, target)
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// ═══════════════════════════════════════════════════════════════════════════
// Start
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn empty_session_completes_immediately() {
    let mut h = Harness::new(Vec::new());
    h.controller.start();

    assert_eq!(h.mode(), SessionMode::Completed);
    assert!(h.controller.is_finished());
    assert_eq!(h.snap().pending_prompt, None);
    assert!(h.completions().is_empty());
}

#[test]
fn start_enters_first_exercise_in_session_order() {
    let cooldown = Exercise::timed(1, "Stretch", Category::Cooldown, 1, 60);
    let workout = Exercise::with_reps(2, "Squat", Category::Workout, 3, 12);
    let warmup = Exercise::timed(3, "Jog", Category::WarmUp, 1, 120);
    let h = Harness::started(vec![cooldown, workout, warmup]);

    let ids: Vec<i64> = h.controller.exercises().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let snap = h.snap();
    assert_eq!(snap.mode, SessionMode::ExerciseActive);
    assert_eq!(
        snap.position(),
        SetPosition { exercise_index: 0, set: 1, mode: SessionMode::ExerciseActive }
    );
    assert_eq!(snap.remaining_time, Duration::from_secs(120));
    assert_eq!(snap.total_time, Duration::from_secs(120));
    assert!(!snap.is_timer_running);
}

#[test]
fn rep_exercise_starts_counting_from_zero() {
    let h = Harness::started(vec![reps(1, 2, 10)]);
    assert_eq!(h.mode(), SessionMode::RepCounting);
    assert_eq!(h.snap().entered_reps, 0);
    assert_eq!(h.snap().target_reps(), Some(10));
}

#[test]
fn start_twice_is_ignored() {
    let mut h = Harness::started(vec![reps(1, 2, 10)]);
    h.do_reps("10");
    let before = h.snap();
    h.controller.start();
    assert_eq!(h.snap(), before);
}

// ═══════════════════════════════════════════════════════════════════════════
// complete_set
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn duration_complete_set_never_prompts() {
    let mut h = Harness::started(vec![timed(1, 2, 30)]);
    h.controller.complete_set();

    let snap = h.snap();
    assert_eq!(snap.pending_prompt, None);
    assert_eq!(snap.mode, SessionMode::Resting);
    assert_eq!(snap.current_set, 2);
    assert_eq!(snap.remaining_time, REST_DURATION);
    assert_eq!(snap.total_time, REST_DURATION);
    assert!(!snap.is_timer_running);
    assert_eq!(snap.completed_sets, 1);
    assert!(!snap.processing);
}

#[test]
fn insufficient_reps_prompt_and_decline_leaves_state_unchanged() {
    let mut h = Harness::started(vec![reps(1, 2, 10)]);
    h.controller.set_reps("4");
    let before = h.snap();

    h.controller.complete_set();
    assert_eq!(
        h.snap().pending_prompt,
        Some(Prompt::InsufficientReps { entered: 4, target: 10 })
    );
    assert!(h.snap().processing);

    h.controller.answer(false);
    assert_eq!(h.snap(), before);
    assert!(h.completions().is_empty());
}

#[test]
fn scenario_b_confirmed_short_set_advances_without_completion() {
    let mut h = Harness::started(vec![reps(1, 1, 10), timed(2, 1, 20)]);
    h.do_reps("5");
    assert!(matches!(h.snap().pending_prompt, Some(Prompt::InsufficientReps { .. })));

    h.controller.answer(true);

    assert_eq!(h.position(), (1, 1));
    assert_eq!(h.mode(), SessionMode::ExerciseActive);
    assert!(h.completions().is_empty());
}

#[test]
fn enough_reps_completes_exercise() {
    let mut h = Harness::started(vec![reps(1, 2, 10)]);
    h.do_reps("10");
    assert_eq!(h.mode(), SessionMode::Resting);
    h.controller.skip_rest();
    h.do_reps("12");

    assert_eq!(h.mode(), SessionMode::Completed);
    assert_eq!(h.completions(), vec![1]);
    assert_eq!(h.snap().pending_prompt, Some(Prompt::WorkoutComplete));
}

#[test]
fn one_overridden_set_blocks_completion() {
    let mut h = Harness::started(vec![reps(1, 2, 10)]);
    h.do_reps("3");
    h.controller.answer(true);
    assert!(!h.proper());
    h.controller.skip_rest();
    h.do_reps("10");

    assert_eq!(h.mode(), SessionMode::Completed);
    assert!(h.completions().is_empty());
}

#[test]
fn duplicate_complete_set_while_prompt_pending_is_dropped() {
    let mut h = Harness::started(vec![reps(1, 2, 10)]);
    h.do_reps("2");
    let pending = h.snap();

    h.controller.complete_set();
    h.controller.previous_set();
    assert_eq!(h.snap(), pending);

    h.controller.answer(true);
    assert_eq!(h.position(), (0, 2));
    assert_eq!(h.mode(), SessionMode::Resting);
}

#[test]
fn complete_set_at_stale_position_is_dropped() {
    let mut h = Harness::started(vec![timed(1, 2, 30)]);
    let shown = h.snap().position();
    h.controller.complete_set_at(shown);
    assert_eq!(h.position(), (0, 2));

    // Second press still refers to set 1
    h.controller.skip_rest();
    h.controller.complete_set_at(shown);
    assert_eq!(h.position(), (0, 2));
    assert_eq!(h.mode(), SessionMode::ExerciseActive);
}

#[test]
fn press_from_rest_screen_does_not_complete_the_next_set() {
    let mut h = Harness::started(vec![timed(1, 2, 30)]);
    h.controller.complete_set();
    let resting = h.snap().position();
    assert_eq!(resting.mode, SessionMode::Resting);

    // Rest ends before the press queued during it is handled
    h.controller.skip_rest();
    h.controller.complete_set_at(resting);

    assert_eq!((h.position(), h.mode()), ((0, 2), SessionMode::ExerciseActive));
    assert_eq!(h.completed_sets(), 1);
    assert!(h.completions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn press_from_rest_screen_racing_rest_finish_is_dropped() {
    let mut h = Harness::started(vec![timed(1, 2, 30), reps(2, 1, 10)]);
    h.controller.complete_set();
    h.controller.toggle_pause_resume();
    let resting = h.snap().position();

    advance(REST_DURATION.as_millis() as u64 + 50).await;
    h.pump();
    h.controller.complete_set_at(resting);

    assert_eq!((h.position(), h.mode()), ((0, 2), SessionMode::ExerciseActive));
    assert!(h.completions().is_empty());
}

#[test]
fn complete_set_is_ignored_while_resting() {
    let mut h = Harness::started(vec![timed(1, 3, 30)]);
    h.controller.complete_set();
    h.controller.complete_set();
    assert_eq!(h.position(), (0, 2));
    assert_eq!(h.mode(), SessionMode::Resting);
    assert_eq!(h.completed_sets(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Rep counter
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn rep_entry_parsing_and_counter() {
    let mut h = Harness::started(vec![reps(1, 1, 10)]);
    h.controller.set_reps(" 7 ");
    assert_eq!(h.snap().entered_reps, 7);

    h.controller.set_reps("seven");
    assert_eq!(h.snap().entered_reps, 0);

    h.controller.decrement_reps();
    assert_eq!(h.snap().entered_reps, 0);

    h.controller.increment_reps();
    h.controller.increment_reps();
    assert_eq!(h.snap().entered_reps, 2);
    h.controller.decrement_reps();
    assert_eq!(h.snap().entered_reps, 1);
}

#[test]
fn rep_entry_is_ignored_on_timed_exercise() {
    let mut h = Harness::started(vec![timed(1, 1, 30)]);
    h.controller.set_reps("12");
    h.controller.increment_reps();
    assert_eq!(h.snap().entered_reps, 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Forward navigation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_c_next_set_never_marks_complete() {
    let mut h = Harness::started(vec![reps(1, 3, 10), reps(2, 1, 5)]);

    h.controller.next_set();
    assert_eq!((h.position(), h.mode()), ((0, 2), SessionMode::Resting));
    h.controller.next_set();
    assert_eq!((h.position(), h.mode()), ((0, 3), SessionMode::Resting));
    h.controller.next_set();
    assert_eq!((h.position(), h.mode()), ((1, 1), SessionMode::RepCounting));

    h.do_reps("5");
    assert_eq!(h.mode(), SessionMode::Completed);
    assert_eq!(h.completions(), vec![2]);
}

#[test]
fn skipping_last_exercise_clears_set_count() {
    let mut h = Harness::started(vec![timed(1, 2, 30)]);
    h.controller.complete_set();
    h.controller.skip_rest();
    assert_eq!(h.completed_sets(), 1);

    h.controller.next_set();
    let done = h.snap();
    assert_eq!(done.mode, SessionMode::Completed);
    assert_eq!(done.completed_sets, 0);
    assert!(h.completions().is_empty());
}

#[test]
fn skipping_one_set_blocks_completion() {
    let mut h = Harness::started(vec![timed(1, 2, 30)]);
    h.controller.next_set();
    h.controller.skip_rest();
    h.controller.complete_set();

    assert_eq!(h.mode(), SessionMode::Completed);
    assert!(h.completions().is_empty());
}

#[test]
fn next_set_dismisses_pending_rep_prompt() {
    let mut h = Harness::started(vec![reps(1, 2, 10)]);
    h.do_reps("1");
    h.controller.next_set();

    let snap = h.snap();
    assert_eq!(snap.pending_prompt, None);
    assert!(!snap.processing);
    assert_eq!(
        snap.position(),
        SetPosition { exercise_index: 0, set: 2, mode: SessionMode::Resting }
    );

    // A late "yes" has nothing to confirm
    h.controller.answer(true);
    assert_eq!(h.position(), (0, 2));
    assert_eq!(h.completed_sets(), 0);
}

#[test]
fn completed_is_terminal() {
    let mut h = Harness::started(vec![timed(1, 1, 30)]);
    h.controller.next_set();
    assert_eq!(h.mode(), SessionMode::Completed);
    let done = h.snap();
    assert_eq!(done.exercise_index, 1);

    h.controller.next_set();
    h.controller.previous_set();
    h.controller.complete_set();
    h.controller.skip_rest();
    h.controller.toggle_pause_resume();
    assert_eq!(h.snap(), done);

    h.controller.answer(false);
    assert_eq!(h.snap().pending_prompt, Some(Prompt::WorkoutComplete));
    assert!(!h.controller.is_finished());

    h.controller.answer(true);
    assert!(h.controller.is_finished());
}

// ═══════════════════════════════════════════════════════════════════════════
// Backward navigation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn previous_set_at_first_set_is_noop() {
    let mut h = Harness::started(vec![reps(1, 2, 10), timed(2, 1, 30)]);
    h.controller.set_reps("3");
    let before = h.snap();
    h.controller.previous_set();
    assert_eq!(h.snap(), before);
}

#[test]
fn previous_set_while_resting_returns_to_finished_set() {
    let mut h = Harness::started(vec![timed(1, 3, 30)]);
    h.controller.complete_set();
    h.controller.skip_rest();
    h.controller.complete_set();
    assert_eq!((h.position(), h.mode()), ((0, 3), SessionMode::Resting));
    assert_eq!(h.completed_sets(), 2);

    h.controller.previous_set();
    assert_eq!((h.position(), h.mode()), ((0, 2), SessionMode::ExerciseActive));
    assert_eq!(h.snap().remaining_time, Duration::from_secs(30));
    assert_eq!(h.completed_sets(), 2);

    // Redoing the set overwrites it rather than double counting
    h.controller.complete_set();
    assert_eq!(h.completed_sets(), 2);
    h.controller.skip_rest();
    h.controller.complete_set();
    assert_eq!(h.completions(), vec![1]);
}

#[test]
fn previous_set_within_exercise_reopens_the_earlier_set() {
    let mut h = Harness::started(vec![reps(1, 3, 10)]);
    h.do_reps("10");
    h.controller.skip_rest();
    h.do_reps("10");
    h.controller.skip_rest();
    assert_eq!((h.position(), h.completed_sets()), ((0, 3), 2));

    h.controller.previous_set();
    assert_eq!(h.position(), (0, 2));
    assert_eq!(h.mode(), SessionMode::RepCounting);
    assert_eq!(h.completed_sets(), 1);
    assert_eq!(h.snap().entered_reps, 0);
}

#[test]
fn previous_set_to_set_one_restarts_tracking() {
    let mut h = Harness::started(vec![reps(1, 2, 10)]);
    h.do_reps("10");
    h.controller.skip_rest();
    h.controller.previous_set();

    assert_eq!(h.position(), (0, 1));
    assert_eq!(h.completed_sets(), 0);
    assert!(h.proper());
}

#[test]
fn previous_set_crosses_into_previous_exercise_with_fresh_tracking() {
    let mut h = Harness::started(vec![timed(1, 2, 30), reps(2, 1, 10)]);
    h.controller.complete_set();
    h.controller.skip_rest();
    h.controller.complete_set();
    assert_eq!(h.completions(), vec![1]);
    assert_eq!(h.position(), (1, 1));

    h.controller.previous_set();
    assert_eq!(h.position(), (0, 2));
    assert_eq!(h.mode(), SessionMode::ExerciseActive);
    assert_eq!(h.completed_sets(), 0);

    // Only one of two sets is on record for this pass, so no second write
    h.controller.complete_set();
    assert_eq!(h.position(), (1, 1));
    assert!(h.completions().is_empty());
}

#[test]
fn redoing_an_overridden_set_restores_properness() {
    let mut h = Harness::started(vec![reps(1, 3, 10)]);
    h.do_reps("10");
    h.controller.skip_rest();
    h.do_reps("6");
    h.controller.answer(true);
    assert_eq!((h.position(), h.mode()), ((0, 3), SessionMode::Resting));
    assert!(!h.proper());

    h.controller.previous_set();
    assert_eq!(h.position(), (0, 2));
    h.do_reps("10");
    assert!(h.proper());
    assert_eq!(h.completed_sets(), 2);

    h.controller.skip_rest();
    h.do_reps("11");
    assert_eq!(h.completions(), vec![1]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Exit
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn exit_requires_confirmation_and_writes_nothing() {
    let mut h = Harness::started(vec![reps(1, 1, 10), timed(2, 1, 30)]);
    h.controller.request_exit();
    assert_eq!(h.snap().pending_prompt, Some(Prompt::ConfirmExit));

    h.controller.answer(false);
    assert!(!h.controller.is_finished());
    assert_eq!(h.snap().pending_prompt, None);

    h.controller.request_exit();
    h.controller.answer(true);
    assert!(h.controller.is_finished());
    assert!(h.completions().is_empty());
}

#[test]
fn exit_replaces_pending_rep_prompt() {
    let mut h = Harness::started(vec![reps(1, 1, 10)]);
    h.do_reps("1");
    h.controller.request_exit();

    let snap = h.snap();
    assert_eq!(snap.pending_prompt, Some(Prompt::ConfirmExit));
    assert!(!snap.processing);

    // Short reps can't stack a second prompt on top of the exit question
    h.controller.complete_set();
    assert_eq!(h.snap().pending_prompt, Some(Prompt::ConfirmExit));
    assert_eq!(h.position(), (0, 1));
}

// ═══════════════════════════════════════════════════════════════════════════
// Timers
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn toggle_is_ignored_for_rep_exercise() {
    let mut h = Harness::started(vec![reps(1, 1, 10)]);
    h.controller.toggle_pause_resume();
    assert!(!h.snap().is_timer_running);
}

#[tokio::test(start_paused = true)]
async fn scenario_a_two_timer_finishes_complete_the_exercise() {
    let mut h = Harness::started(vec![timed(1, 2, 30), reps(2, 1, 10)]);

    h.controller.toggle_pause_resume();
    assert!(h.snap().is_timer_running);
    advance(30_050).await;
    h.pump();

    assert_eq!((h.position(), h.mode()), ((0, 2), SessionMode::Resting));
    assert_eq!(h.completed_sets(), 1);
    assert!(h.proper());

    h.controller.skip_rest();
    h.controller.toggle_pause_resume();
    advance(30_050).await;
    h.pump();

    assert_eq!((h.position(), h.mode()), ((1, 1), SessionMode::RepCounting));
    assert_eq!(h.completions(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn ticks_update_remaining_time() {
    let mut h = Harness::started(vec![timed(1, 1, 10)]);
    h.controller.toggle_pause_resume();
    advance(2_550).await;
    h.pump();

    assert_eq!(h.snap().remaining_time, Duration::from_millis(7_500));
    assert_eq!(h.snap().clock(), "0:07");
}

#[tokio::test(start_paused = true)]
async fn manual_press_racing_timer_finish_transitions_once() {
    let mut h = Harness::started(vec![timed(1, 3, 5)]);
    h.controller.toggle_pause_resume();
    advance(5_050).await;

    // Finished is queued but not yet delivered when the button press lands
    h.controller.complete_set();
    h.pump();

    assert_eq!((h.position(), h.mode()), ((0, 2), SessionMode::Resting));
    assert_eq!(h.completed_sets(), 1);
}

#[tokio::test(start_paused = true)]
async fn pause_then_resume_preserves_remaining_time() {
    let mut h = Harness::started(vec![timed(1, 2, 30)]);
    h.controller.toggle_pause_resume();
    advance(10_250).await;
    h.pump();

    h.controller.toggle_pause_resume();
    let paused = h.snap();
    assert!(!paused.is_timer_running);
    assert_eq!(paused.remaining_time, Duration::from_millis(19_750));

    advance(60_000).await;
    h.pump();
    assert_eq!(h.snap().remaining_time, Duration::from_millis(19_750));
    assert_eq!(h.mode(), SessionMode::ExerciseActive);

    h.controller.toggle_pause_resume();
    advance(19_700).await;
    h.pump();
    assert_eq!(h.mode(), SessionMode::ExerciseActive);

    advance(100).await;
    h.pump();
    assert_eq!((h.position(), h.mode()), ((0, 2), SessionMode::Resting));
}

#[tokio::test(start_paused = true)]
async fn suspend_pauses_running_timer() {
    let mut h = Harness::started(vec![timed(1, 1, 30)]);
    h.controller.toggle_pause_resume();
    advance(5_000).await;
    h.pump();

    h.controller.suspend();
    assert!(!h.snap().is_timer_running);
    assert_eq!(h.snap().remaining_time, Duration::from_secs(25));

    advance(120_000).await;
    h.pump();
    assert_eq!(h.mode(), SessionMode::ExerciseActive);
    assert_eq!(h.snap().remaining_time, Duration::from_secs(25));
}

#[tokio::test(start_paused = true)]
async fn rest_finish_enters_next_set() {
    let mut h = Harness::started(vec![timed(1, 2, 45)]);
    h.controller.complete_set();
    h.controller.toggle_pause_resume();
    advance(REST_DURATION.as_millis() as u64 + 50).await;
    h.pump();

    let snap = h.snap();
    assert_eq!(snap.mode, SessionMode::ExerciseActive);
    assert_eq!(snap.current_set, 2);
    assert_eq!(snap.remaining_time, Duration::from_secs(45));
    assert!(!snap.is_timer_running);
    assert_eq!(snap.completed_sets, 1);
}

#[tokio::test(start_paused = true)]
async fn skip_rest_cancels_rest_timer() {
    let mut h = Harness::started(vec![timed(1, 3, 45)]);
    h.controller.complete_set();
    h.controller.toggle_pause_resume();
    advance(1_000).await;
    h.controller.skip_rest();

    advance(60_000).await;
    h.pump();
    assert_eq!((h.position(), h.mode()), ((0, 2), SessionMode::ExerciseActive));
    assert!(!h.snap().is_timer_running);
}

#[tokio::test(start_paused = true)]
async fn navigation_cancels_running_timer() {
    let mut h = Harness::started(vec![timed(1, 2, 10), timed(2, 1, 10)]);
    h.controller.toggle_pause_resume();
    advance(3_000).await;
    h.controller.next_set();
    assert_eq!(h.mode(), SessionMode::Resting);

    advance(30_000).await;
    h.pump();
    assert_eq!((h.position(), h.mode()), ((0, 2), SessionMode::Resting));
    assert_eq!(h.completed_sets(), 0);
}

#[tokio::test(start_paused = true)]
async fn auto_start_runs_timers_on_entry() {
    let options = SessionOptions {
        tick: Duration::from_millis(100),
        auto_start_timers: true,
    };
    let mut h = Harness::with_options(vec![timed(1, 2, 5)], options);
    h.controller.start();
    assert!(h.snap().is_timer_running);

    advance(5_050).await;
    h.pump();
    assert_eq!(h.mode(), SessionMode::Resting);
    assert!(h.snap().is_timer_running);
}
