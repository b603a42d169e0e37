//! Terminal rendering of session snapshots

use tokio::sync::watch;
use tokio::task::JoinHandle;
use wellness_core::exercise::{Exercise, ExerciseTarget};
use wellness_core::session::{Prompt, SessionMode, SessionSnapshot};
use wellness_core::timers::format_clock;

/// One-line description of an exercise's target
pub fn describe_target(exercise: &Exercise) -> String {
    match exercise.target() {
        ExerciseTarget::Reps(reps) => format!("{} x {} reps", exercise.sets, reps),
        ExerciseTarget::Duration(duration) => {
            format!("{} x {}", exercise.sets, format_clock(duration))
        }
    }
}

/// Multi-line status block for the current snapshot
pub fn render(snap: &SessionSnapshot) -> String {
    let mut lines = Vec::new();

    match (&snap.mode, &snap.exercise) {
        (SessionMode::Idle, _) => lines.push("Session not started".to_string()),
        (SessionMode::Completed, _) | (_, None) => {
            lines.push(format!("Workout complete ({}%)", snap.progress_percent()));
        }
        (mode, Some(exercise)) => {
            lines.push(format!(
                "{} | {} [{}] ({}%)",
                snap.progress_label(),
                exercise.name,
                exercise.category.label(),
                snap.progress_percent()
            ));
            lines.push(format!("{} | {}", snap.set_label(), describe_target(exercise)));

            match mode {
                SessionMode::RepCounting => {
                    let target = snap.target_reps().unwrap_or(0);
                    lines.push(format!("Reps: {} / {}", snap.entered_reps, target));
                }
                SessionMode::Resting => lines.push(format!(
                    "Rest {} {}",
                    snap.clock(),
                    timer_state(snap)
                )),
                _ => lines.push(format!(
                    "Time {} / {} {}",
                    snap.clock(),
                    format_clock(snap.total_time),
                    timer_state(snap)
                )),
            }

            let nav = match (snap.has_previous(), snap.has_next()) {
                (true, true) => "prev | next",
                (true, false) => "prev",
                (false, true) => "next",
                (false, false) => "",
            };
            if !nav.is_empty() {
                lines.push(format!("[{nav}]"));
            }
        }
    }

    if let Some(prompt) = &snap.pending_prompt {
        lines.push(format!("? {} (yes/no)", prompt.message()));
    }

    lines.join("\n")
}

fn timer_state(snap: &SessionSnapshot) -> &'static str {
    if snap.is_timer_running { "(running)" } else { "(paused)" }
}

/// Fields whose change is worth re-printing; ticks alone are not
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionKey {
    mode: SessionMode,
    exercise_index: usize,
    current_set: u32,
    entered_reps: u32,
    is_timer_running: bool,
    pending_prompt: Option<Prompt>,
}

impl From<&SessionSnapshot> for TransitionKey {
    fn from(snap: &SessionSnapshot) -> Self {
        Self {
            mode: snap.mode,
            exercise_index: snap.exercise_index,
            current_set: snap.current_set,
            entered_reps: snap.entered_reps,
            is_timer_running: snap.is_timer_running,
            pending_prompt: snap.pending_prompt,
        }
    }
}

/// Print the session whenever it transitions, until the session ends
pub fn spawn_display(mut snapshots: watch::Receiver<SessionSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last: Option<TransitionKey> = None;
        loop {
            let (key, text, finished) = {
                let snap = snapshots.borrow_and_update();
                (TransitionKey::from(&*snap), render(&snap), snap.finished)
            };

            if finished {
                println!("\nSession ended");
                break;
            }
            if last.as_ref() != Some(&key) {
                println!("\n{text}");
                last = Some(key);
            }

            if snapshots.changed().await.is_err() {
                println!("\nSession ended");
                break;
            }
        }
    })
}
