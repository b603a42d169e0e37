//! Session service - runs a `SessionController` on a single task
//!
//! Architecture:
//! - SessionHandle: cloneable sender for commands + snapshot subscription
//! - SessionService: background task that owns the controller and handles
//!   commands and timer events one at a time (`tokio::select!` over both
//!   channels), so no two transitions ever interleave

use tokio::sync::{mpsc, watch};

use super::controller::{SessionController, SessionOptions};
use super::error::SessionError;
use super::state::{SessionSnapshot, SetPosition};
use crate::exercise::Exercise;
use crate::store::CompletionRequest;
use crate::timers::TimerEvent;

// ─────────────────────────────────────────────────────────────────────────────
// Session Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Messages sent to the session from a front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Finish the current set; `at` drops the command if the session moved on
    CompleteSet { at: Option<SetPosition> },
    NextSet,
    PreviousSet,
    TogglePause,
    SkipRest,
    /// The screen went to the background
    Suspend,
    SetReps(String),
    IncrementReps,
    DecrementReps,
    RequestExit,
    Answer(bool),
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Service
// ─────────────────────────────────────────────────────────────────────────────

pub struct SessionService {
    controller: SessionController,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
}

impl SessionService {
    /// Create a session over `exercises` and return a handle to drive it
    pub fn new(
        exercises: Vec<Exercise>,
        options: SessionOptions,
        completions: mpsc::UnboundedSender<CompletionRequest>,
    ) -> (Self, SessionHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();

        let controller = SessionController::new(exercises, options, timer_tx, completions);
        let handle = SessionHandle {
            cmd_tx,
            snapshots: controller.subscribe(),
        };

        let service = Self {
            controller,
            cmd_rx,
            timer_rx,
        };
        (service, handle)
    }

    /// Start the session and process events until it finishes or every
    /// handle is dropped. Returns the final snapshot.
    pub async fn run(mut self) -> SessionSnapshot {
        self.controller.start();

        while !self.controller.is_finished() {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => self.apply(cmd),
                    None => {
                        tracing::debug!("All session handles dropped, shutting down");
                        break;
                    }
                },
                Some(event) = self.timer_rx.recv() => {
                    self.controller.handle_timer_event(event);
                }
            }
        }

        self.controller.snapshot()
    }

    fn apply(&mut self, cmd: SessionCommand) {
        tracing::debug!(?cmd, "Session command");
        let controller = &mut self.controller;
        match cmd {
            SessionCommand::CompleteSet { at: Some(at) } => controller.complete_set_at(at),
            SessionCommand::CompleteSet { at: None } => controller.complete_set(),
            SessionCommand::NextSet => controller.next_set(),
            SessionCommand::PreviousSet => controller.previous_set(),
            SessionCommand::TogglePause => controller.toggle_pause_resume(),
            SessionCommand::SkipRest => controller.skip_rest(),
            SessionCommand::Suspend => controller.suspend(),
            SessionCommand::SetReps(text) => controller.set_reps(&text),
            SessionCommand::IncrementReps => controller.increment_reps(),
            SessionCommand::DecrementReps => controller.decrement_reps(),
            SessionCommand::RequestExit => controller.request_exit(),
            SessionCommand::Answer(yes) => controller.answer(yes),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to drive a running session and observe its state
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Complete the set currently on screen
    pub async fn complete_set(&self) -> Result<(), SessionError> {
        let at = self.snapshot().position();
        self.send(SessionCommand::CompleteSet { at: Some(at) }).await
    }

    pub async fn next_set(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::NextSet).await
    }

    pub async fn previous_set(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::PreviousSet).await
    }

    pub async fn toggle_pause(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::TogglePause).await
    }

    pub async fn skip_rest(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::SkipRest).await
    }

    pub async fn suspend(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Suspend).await
    }

    pub async fn set_reps(&self, text: &str) -> Result<(), SessionError> {
        self.send(SessionCommand::SetReps(text.to_string())).await
    }

    pub async fn increment_reps(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::IncrementReps).await
    }

    pub async fn decrement_reps(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::DecrementReps).await
    }

    pub async fn request_exit(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::RequestExit).await
    }

    pub async fn answer(&self, yes: bool) -> Result<(), SessionError> {
        self.send(SessionCommand::Answer(yes)).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// New subscription; dropping it releases it
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// True once the service task has stopped
    pub fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }
}
