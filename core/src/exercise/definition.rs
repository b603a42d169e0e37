//! Exercise definitions
//!
//! An `Exercise` is one entry in a day's workout as supplied by the store.
//! Exactly one of `reps` / `duration_secs` is set; `validate` enforces that
//! along with the other shape rules before a session ever sees the value.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ExerciseError;

// ─────────────────────────────────────────────────────────────────────────────
// Category
// ─────────────────────────────────────────────────────────────────────────────

/// Grouping that fixes where an exercise falls in the session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    WarmUp,
    Workout,
    Cooldown,
    /// Anything the store hands us that isn't one of the known groups.
    /// Sorted after all known categories.
    Other(String),
}

impl Category {
    /// Sort rank: WarmUp=0, Workout=1, Cooldown=2, anything else=3
    pub fn rank(&self) -> u8 {
        match self {
            Category::WarmUp => 0,
            Category::Workout => 1,
            Category::Cooldown => 2,
            Category::Other(_) => 3,
        }
    }

    /// Display label
    pub fn label(&self) -> &str {
        match self {
            Category::WarmUp => "Warm-Up",
            Category::Workout => "Workout",
            Category::Cooldown => "Cooldown",
            Category::Other(name) => name,
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        let normalized: String = value
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "warmup" => Category::WarmUp,
            "workout" => Category::Workout,
            "cooldown" => Category::Cooldown,
            _ => Category::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::from(value.as_str())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Exercise
// ─────────────────────────────────────────────────────────────────────────────

/// What finishing one set of an exercise means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseTarget {
    /// Perform at least this many repetitions
    Reps(u32),
    /// Hold / perform for this long
    Duration(Duration),
}

/// A single exercise in a day's workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub sets: u32,

    /// Target repetitions per set (rep-based exercises)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,

    /// Seconds per set (timed exercises)
    #[serde(default, alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,

    /// Position within the category
    #[serde(default)]
    pub order: i32,

    /// Owned by the store; the session never flips this locally.
    #[serde(default)]
    pub is_completed: bool,
}

impl Exercise {
    /// Build a rep-based exercise
    pub fn with_reps(id: i64, name: &str, category: Category, sets: u32, reps: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            category,
            sets,
            reps: Some(reps),
            duration_secs: None,
            order: 0,
            is_completed: false,
        }
    }

    /// Build a timed exercise
    pub fn timed(id: i64, name: &str, category: Category, sets: u32, duration_secs: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            category,
            sets,
            reps: None,
            duration_secs: Some(duration_secs),
            order: 0,
            is_completed: false,
        }
    }

    /// Set the intra-category order (builder style)
    pub fn ordered(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// The set goal. Duration wins if a malformed record carries both.
    pub fn target(&self) -> ExerciseTarget {
        match (self.duration_secs, self.reps) {
            (Some(secs), _) => ExerciseTarget::Duration(Duration::from_secs(u64::from(secs))),
            (None, Some(reps)) => ExerciseTarget::Reps(reps),
            (None, None) => ExerciseTarget::Reps(0),
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self.target(), ExerciseTarget::Duration(_))
    }

    /// Check the shape rules a session relies on
    pub fn validate(&self) -> Result<(), ExerciseError> {
        if self.sets == 0 {
            return Err(ExerciseError::NoSets { id: self.id });
        }
        match (self.reps, self.duration_secs) {
            (Some(_), Some(_)) => Err(ExerciseError::AmbiguousTarget { id: self.id }),
            (None, None) => Err(ExerciseError::MissingTarget { id: self.id }),
            (Some(0), None) => Err(ExerciseError::ZeroReps { id: self.id }),
            (None, Some(0)) => Err(ExerciseError::ZeroDuration { id: self.id }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_known_spellings() {
        assert_eq!(Category::from("Warm-Up"), Category::WarmUp);
        assert_eq!(Category::from("warmup"), Category::WarmUp);
        assert_eq!(Category::from("WORKOUT"), Category::Workout);
        assert_eq!(Category::from("Cool down"), Category::Cooldown);
        assert_eq!(Category::from("Stretch"), Category::Other("Stretch".to_string()));
        assert_eq!(Category::from("Stretch").rank(), 3);
    }

    #[test]
    fn target_prefers_duration() {
        let timed = Exercise::timed(1, "Plank", Category::Workout, 2, 45);
        assert_eq!(timed.target(), ExerciseTarget::Duration(Duration::from_secs(45)));
        assert!(timed.is_timed());

        let reps = Exercise::with_reps(2, "Squat", Category::Workout, 3, 12);
        assert_eq!(reps.target(), ExerciseTarget::Reps(12));
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let mut ex = Exercise::with_reps(7, "Push-up", Category::Workout, 3, 10);
        assert!(ex.validate().is_ok());

        ex.duration_secs = Some(30);
        assert!(matches!(ex.validate(), Err(ExerciseError::AmbiguousTarget { id: 7 })));

        ex.reps = None;
        ex.duration_secs = None;
        assert!(matches!(ex.validate(), Err(ExerciseError::MissingTarget { id: 7 })));

        ex.duration_secs = Some(0);
        assert!(matches!(ex.validate(), Err(ExerciseError::ZeroDuration { id: 7 })));

        let no_sets = Exercise::timed(8, "Wall sit", Category::Workout, 0, 30);
        assert!(matches!(no_sets.validate(), Err(ExerciseError::NoSets { id: 8 })));
    }
}
