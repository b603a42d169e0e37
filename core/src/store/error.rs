//! Error types for exercise store operations

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::exercise::ExerciseError;

/// Errors reading or updating workout data
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read workout file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse workout TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize workout for {path}")]
    SerializeToml {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("failed to write workout file {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read workout directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid exercise in {origin}")]
    InvalidExercise {
        origin: String,
        #[source]
        source: ExerciseError,
    },

    #[error("exercise {id} not found on {date}")]
    UnknownExercise { date: NaiveDate, id: i64 },
}
