//! TOML-backed exercise store
//!
//! One file per day named `YYYY-MM-DD.toml`:
//!
//! ```toml
//! [[exercise]]
//! id = 1
//! name = "Jumping Jacks"
//! category = "Warm-Up"
//! sets = 1
//! duration = 60
//! order = 0
//! ```
//!
//! A missing file is an empty day. Ids are only unique within a file, so
//! completion rewrites that day's file alone; an exercise that is already
//! complete is left untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ExerciseStore, StoreError};
use crate::exercise::Exercise;

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkoutFile {
    #[serde(default, rename = "exercise")]
    exercises: Vec<Exercise>,
}

#[derive(Debug)]
pub struct TomlStore {
    dir: PathBuf,
    /// Serialises read-modify-write of workout files within this process
    write_lock: Mutex<()>,
}

impl TomlStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the file holding `date`'s workout
    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.toml", date.format("%Y-%m-%d")))
    }

    /// Write a whole day, creating the directory if needed
    pub fn save_day(&self, date: NaiveDate, exercises: Vec<Exercise>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::WriteFile {
            path: self.dir.clone(),
            source,
        })?;
        write_file(&self.day_path(date), &WorkoutFile { exercises })
    }

    /// Dated workout files in the directory, oldest first
    pub fn days(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let mut days: Vec<NaiveDate> = self
            .workout_files()?
            .iter()
            .filter_map(|path| path.file_stem()?.to_str())
            .filter_map(|stem| NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok())
            .collect();
        days.sort();
        Ok(days)
    }

    fn workout_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::ReadDir {
            path: self.dir.clone(),
            source,
        })?;

        Ok(entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
            .collect())
    }
}

impl ExerciseStore for TomlStore {
    fn exercises_for(&self, date: NaiveDate) -> Result<Vec<Exercise>, StoreError> {
        let path = self.day_path(date);
        if !path.exists() {
            return Ok(Vec::new());
        }
        Ok(read_file(&path)?.exercises)
    }

    fn mark_complete(&self, date: NaiveDate, exercise_id: i64) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let path = self.day_path(date);
        let unknown = StoreError::UnknownExercise {
            date,
            id: exercise_id,
        };
        if !path.exists() {
            return Err(unknown);
        }

        let mut file = read_file(&path)?;
        let Some(exercise) = file.exercises.iter_mut().find(|e| e.id == exercise_id) else {
            return Err(unknown);
        };

        if exercise.is_completed {
            tracing::debug!(exercise_id, %date, "Exercise already complete");
            return Ok(());
        }
        exercise.is_completed = true;
        write_file(&path, &file)?;
        tracing::debug!(exercise_id, path = %path.display(), "Exercise marked complete");
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<WorkoutFile, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let file: WorkoutFile = toml::from_str(&content).map_err(|source| StoreError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;

    for exercise in &file.exercises {
        exercise.validate().map_err(|source| StoreError::InvalidExercise {
            origin: path.display().to_string(),
            source,
        })?;
    }

    Ok(file)
}

fn write_file(path: &Path, file: &WorkoutFile) -> Result<(), StoreError> {
    let content = toml::to_string_pretty(file).map_err(|source| StoreError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, content).map_err(|source| StoreError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
