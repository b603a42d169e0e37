//! Error types for exercise definitions

use thiserror::Error;

/// Shape violations caught when an exercise is loaded
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExerciseError {
    #[error("exercise {id} has no sets")]
    NoSets { id: i64 },

    #[error("exercise {id} sets both reps and duration")]
    AmbiguousTarget { id: i64 },

    #[error("exercise {id} sets neither reps nor duration")]
    MissingTarget { id: i64 },

    #[error("exercise {id} has a zero rep target")]
    ZeroReps { id: i64 },

    #[error("exercise {id} has a zero duration")]
    ZeroDuration { id: i64 },
}
