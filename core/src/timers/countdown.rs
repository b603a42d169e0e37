//! Cancellable countdown
//!
//! A `Countdown` runs at most one timer at a time on a spawned tokio task.
//! The task reports progress as `TimerEvent::Tick` at a fixed granularity and
//! finishes with exactly one `TimerEvent::Finished`. Events are delivered over
//! an unbounded channel into whoever owns the receiving end (the session
//! service), so they are handled on the same task as user commands.
//!
//! # Stale events
//!
//! Every started timer gets a fresh generation number. Once a timer is
//! cancelled, paused or replaced, events already sitting in the channel still
//! carry the old generation and `accept` rejects them. Cancelling therefore
//! suppresses a pending `Finished` even if the task had already sent it.
//!
//! # Remaining time
//!
//! Remaining time is always derived from the deadline, never accumulated from
//! ticks, so pausing reports the exact time left and resuming with that value
//! picks up where the timer stopped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Event emitted by a running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Progress report; `remaining` is measured against the deadline.
    Tick { generation: u64, remaining: Duration },
    /// The countdown reached zero. Sent once per timer instance.
    Finished { generation: u64 },
}

impl TimerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            TimerEvent::Tick { generation, .. } | TimerEvent::Finished { generation } => *generation,
        }
    }
}

/// The timer currently counting down
#[derive(Debug)]
struct Running {
    generation: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

/// Single-slot countdown timer
#[derive(Debug)]
pub struct Countdown {
    tick: Duration,
    events: mpsc::UnboundedSender<TimerEvent>,
    generation: u64,
    running: Option<Running>,
}

impl Countdown {
    /// Create a countdown reporting progress every `tick`
    pub fn new(tick: Duration, events: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            tick: tick.max(Duration::from_millis(1)),
            events,
            generation: 0,
            running: None,
        }
    }

    /// Start counting down `duration`, replacing any timer already running.
    ///
    /// Must be called from within a tokio runtime. Returns the new timer's generation.
    pub fn start(&mut self, duration: Duration) -> u64 {
        self.cancel();

        self.generation += 1;
        let generation = self.generation;
        let deadline = Instant::now() + duration;
        let task = tokio::spawn(run_countdown(
            generation,
            deadline,
            self.tick,
            self.events.clone(),
        ));

        tracing::debug!(generation, duration_ms = duration.as_millis() as u64, "Countdown started");

        self.running = Some(Running {
            generation,
            deadline,
            task,
        });
        generation
    }

    /// Stop the running timer, returning the time it had left.
    ///
    /// Any tick or finish the timer already queued is rejected by `accept` afterwards.
    pub fn cancel(&mut self) -> Option<Duration> {
        let running = self.running.take()?;
        running.task.abort();
        let remaining = running.deadline.saturating_duration_since(Instant::now());
        tracing::debug!(
            generation = running.generation,
            remaining_ms = remaining.as_millis() as u64,
            "Countdown cancelled"
        );
        Some(remaining)
    }

    /// Pause: identical to `cancel`, named for the caller's intent
    pub fn pause(&mut self) -> Option<Duration> {
        self.cancel()
    }

    /// Resume from a remaining time previously returned by `pause`
    pub fn resume(&mut self, remaining: Duration) -> u64 {
        self.start(remaining)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Time left on the running timer, if any
    pub fn remaining(&self) -> Option<Duration> {
        self.running
            .as_ref()
            .map(|r| r.deadline.saturating_duration_since(Instant::now()))
    }

    /// Decide whether an event from the channel belongs to the running timer.
    ///
    /// Accepting a `Finished` retires the timer, so a second finish for the same
    /// generation can never be accepted.
    pub fn accept(&mut self, event: &TimerEvent) -> bool {
        let current = match &self.running {
            Some(running) if running.generation == event.generation() => true,
            _ => false,
        };

        if current && matches!(event, TimerEvent::Finished { .. }) {
            self.running = None;
        }
        current
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.task.abort();
        }
    }
}

async fn run_countdown(
    generation: u64,
    deadline: Instant,
    tick: Duration,
    events: mpsc::UnboundedSender<TimerEvent>,
) {
    loop {
        let now = Instant::now();
        if now >= deadline {
            let _ = events.send(TimerEvent::Finished { generation });
            return;
        }

        sleep_until((now + tick).min(deadline)).await;

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            continue;
        }
        if events.send(TimerEvent::Tick { generation, remaining }).is_err() {
            // Receiver gone, nobody left to notify
            return;
        }
    }
}
