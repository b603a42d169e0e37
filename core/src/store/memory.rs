//! In-memory exercise store

use std::sync::{PoisonError, RwLock};

use chrono::NaiveDate;
use hashbrown::HashMap;

use super::{ExerciseStore, StoreError};
use crate::exercise::Exercise;

/// Workouts keyed by date, held in memory.
///
/// Counts completion writes so callers can observe that a write happened
/// even when it didn't change anything.
#[derive(Debug, Default)]
pub struct MemoryStore {
    days: RwLock<HashMap<NaiveDate, Vec<Exercise>>>,
    writes: RwLock<HashMap<(NaiveDate, i64), u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the workout for a day, validating each exercise
    pub fn insert_day(&self, date: NaiveDate, exercises: Vec<Exercise>) -> Result<(), StoreError> {
        for exercise in &exercises {
            exercise.validate().map_err(|source| StoreError::InvalidExercise {
                origin: date.to_string(),
                source,
            })?;
        }
        self.days
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(date, exercises);
        Ok(())
    }

    /// Builder-style `insert_day` for tests and demos
    pub fn with_day(self, date: NaiveDate, exercises: Vec<Exercise>) -> Result<Self, StoreError> {
        self.insert_day(date, exercises)?;
        Ok(self)
    }

    pub fn is_completed(&self, date: NaiveDate, exercise_id: i64) -> bool {
        self.days
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&date)
            .is_some_and(|day| day.iter().any(|e| e.id == exercise_id && e.is_completed))
    }

    /// How many times `mark_complete` was called for an exercise
    pub fn completion_writes(&self, date: NaiveDate, exercise_id: i64) -> u32 {
        self.writes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(date, exercise_id))
            .copied()
            .unwrap_or(0)
    }
}

impl ExerciseStore for MemoryStore {
    fn exercises_for(&self, date: NaiveDate) -> Result<Vec<Exercise>, StoreError> {
        Ok(self
            .days
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&date)
            .cloned()
            .unwrap_or_default())
    }

    fn mark_complete(&self, date: NaiveDate, exercise_id: i64) -> Result<(), StoreError> {
        let mut days = self.days.write().unwrap_or_else(PoisonError::into_inner);
        let exercise = days
            .get_mut(&date)
            .and_then(|day| day.iter_mut().find(|e| e.id == exercise_id))
            .ok_or(StoreError::UnknownExercise {
                date,
                id: exercise_id,
            })?;
        exercise.is_completed = true;

        *self
            .writes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((date, exercise_id))
            .or_insert(0) += 1;
        Ok(())
    }
}
