//! Session ordering
//!
//! Exercises run by category rank (WarmUp, Workout, Cooldown, other), then by
//! their explicit `order`. `sort_by_key` is stable, so equal keys keep the
//! order the store returned them in.

use super::{Category, Exercise};

/// Sort a day's exercises into session order
pub fn sort_for_session(mut exercises: Vec<Exercise>) -> Vec<Exercise> {
    exercises.sort_by_key(|e| (e.category.rank(), e.order));
    exercises
}

/// One row of a grouped workout listing
#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutItem {
    Header(Category),
    Exercise(Exercise),
}

/// Sort and interleave category headers.
///
/// A header is emitted whenever the category changes, so two distinct
/// `Other` categories each get their own header.
pub fn group_by_category(exercises: Vec<Exercise>) -> Vec<WorkoutItem> {
    let mut items = Vec::with_capacity(exercises.len() + 3);
    let mut current: Option<Category> = None;

    for exercise in sort_for_session(exercises) {
        if current.as_ref() != Some(&exercise.category) {
            current = Some(exercise.category.clone());
            items.push(WorkoutItem::Header(exercise.category.clone()));
        }
        items.push(WorkoutItem::Exercise(exercise));
    }

    items
}
