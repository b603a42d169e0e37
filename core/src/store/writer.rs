//! Completion writer
//!
//! Sessions never touch the store directly. They queue a `CompletionRequest`
//! and this task applies it on the blocking pool, so a slow disk can't hold
//! up ticks or commands. Failures are logged and dropped.
//!
//! A writer serves one session, so it is bound to that session's day.

use std::sync::Arc;

use chrono::NaiveDate;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::ExerciseStore;

/// "Mark this exercise complete"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRequest {
    pub exercise_id: i64,
}

/// Drain completion requests for `date` into `store` until every sender is dropped
pub fn spawn_completion_writer(
    store: Arc<dyn ExerciseStore>,
    date: NaiveDate,
    mut requests: mpsc::UnboundedReceiver<CompletionRequest>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(CompletionRequest { exercise_id }) = requests.recv().await {
            let store = Arc::clone(&store);
            let result =
                tokio::task::spawn_blocking(move || store.mark_complete(date, exercise_id)).await;

            match result {
                Ok(Ok(())) => tracing::info!(exercise_id, %date, "Completion saved"),
                Ok(Err(e)) => {
                    tracing::error!(exercise_id, %date, error = %e, "Failed to save completion")
                }
                Err(e) => {
                    tracing::error!(exercise_id, %date, error = %e, "Completion write task failed")
                }
            }
        }
        tracing::debug!("Completion writer stopped");
    })
}
