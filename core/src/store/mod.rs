//! Exercise store
//!
//! The session engine reads a day's exercises from a store and writes back
//! "mark complete" for exercises whose every set was done properly.
//!
//! - `MemoryStore`: in-process map keyed by date
//! - `TomlStore`: one `YYYY-MM-DD.toml` file per day in a directory
//! - `spawn_completion_writer`: background task applying completion requests

mod error;
mod memory;
mod toml_store;
mod writer;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use toml_store::TomlStore;
pub use writer::{CompletionRequest, spawn_completion_writer};

use chrono::NaiveDate;
use serde::Serialize;

use crate::exercise::{Exercise, sort_for_session};

/// Completed vs. total exercises for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionSummary {
    pub completed: usize,
    pub total: usize,
}

impl CompletionSummary {
    pub fn from_exercises(exercises: &[Exercise]) -> Self {
        Self {
            completed: exercises.iter().filter(|e| e.is_completed).count(),
            total: exercises.len(),
        }
    }

    pub fn is_all_done(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Source of daily workouts and sink for completion writes
pub trait ExerciseStore: Send + Sync {
    /// All exercises scheduled for `date`, in storage order
    fn exercises_for(&self, date: NaiveDate) -> Result<Vec<Exercise>, StoreError>;

    /// Mark an exercise on `date` complete. Repeating the call is harmless.
    ///
    /// Ids only need to be unique within a day, so the date is part of the key.
    fn mark_complete(&self, date: NaiveDate, exercise_id: i64) -> Result<(), StoreError>;

    fn completion_summary(&self, date: NaiveDate) -> Result<CompletionSummary, StoreError> {
        Ok(CompletionSummary::from_exercises(&self.exercises_for(date)?))
    }
}

/// Load a day's exercises in session order
pub fn load_day(store: &dyn ExerciseStore, date: NaiveDate) -> Result<Vec<Exercise>, StoreError> {
    let exercises = store.exercises_for(date)?;
    tracing::debug!(%date, count = exercises.len(), "Loaded workout");
    Ok(sort_for_session(exercises))
}
