//! Exercise model
//!
//! This module provides:
//! - **Definitions**: `Exercise` records as supplied by the store
//! - **Ordering**: the deterministic session order and the grouped listing

mod definition;
mod error;
mod ordering;

pub use definition::{Category, Exercise, ExerciseTarget};
pub use error::ExerciseError;
pub use ordering::{WorkoutItem, group_by_category, sort_for_session};
