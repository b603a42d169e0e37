//! Per-exercise completion bookkeeping
//!
//! The tracker keeps one slot per set of the current exercise. A slot is
//! filled when the set goes through `complete_set` and cleared when backward
//! navigation re-opens it. Both the completed count and the "properly
//! completed" flag are derived from the slots, so redoing a set overwrites
//! its earlier outcome instead of double counting.

use serde::Serialize;

/// How a set was finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SetOutcome {
    /// Reps met the target, or the set was timed
    Completed,
    /// Fewer reps than the target, confirmed by the user
    Overridden,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompletionTracker {
    outcomes: Vec<Option<SetOutcome>>,
}

impl CompletionTracker {
    pub fn new(sets: u32) -> Self {
        let mut tracker = Self::default();
        tracker.reset(sets);
        tracker
    }

    /// Start a fresh pass over an exercise with `sets` sets
    pub fn reset(&mut self, sets: u32) {
        self.outcomes.clear();
        self.outcomes.resize(sets as usize, None);
    }

    /// Record the outcome of 1-based `set`
    pub fn record(&mut self, set: u32, outcome: SetOutcome) {
        if let Some(slot) = self.slot_mut(set) {
            *slot = Some(outcome);
        }
    }

    /// Re-open 1-based `set` so it has to be done again
    pub fn clear(&mut self, set: u32) {
        if let Some(slot) = self.slot_mut(set) {
            *slot = None;
        }
    }

    /// Sets finished with the target met (never exceeds the set count)
    pub fn completed_sets(&self) -> u32 {
        self.outcomes
            .iter()
            .filter(|o| **o == Some(SetOutcome::Completed))
            .count() as u32
    }

    /// False once any set in this pass was overridden
    pub fn all_sets_completed_properly(&self) -> bool {
        !self.outcomes.contains(&Some(SetOutcome::Overridden))
    }

    /// The store write fires only when every set was completed properly
    pub fn should_mark_complete(&self, sets: u32) -> bool {
        self.all_sets_completed_properly() && self.completed_sets() == sets
    }

    fn slot_mut(&mut self, set: u32) -> Option<&mut Option<SetOutcome>> {
        let index = (set as usize).checked_sub(1)?;
        self.outcomes.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tracker_is_proper_and_empty() {
        let tracker = CompletionTracker::new(3);
        assert_eq!(tracker.completed_sets(), 0);
        assert!(tracker.all_sets_completed_properly());
        assert!(!tracker.should_mark_complete(3));
    }

    #[test]
    fn all_sets_completed_marks_complete() {
        let mut tracker = CompletionTracker::new(2);
        tracker.record(1, SetOutcome::Completed);
        tracker.record(2, SetOutcome::Completed);
        assert_eq!(tracker.completed_sets(), 2);
        assert!(tracker.should_mark_complete(2));
    }

    #[test]
    fn override_blocks_completion() {
        let mut tracker = CompletionTracker::new(2);
        tracker.record(1, SetOutcome::Overridden);
        tracker.record(2, SetOutcome::Completed);
        assert_eq!(tracker.completed_sets(), 1);
        assert!(!tracker.all_sets_completed_properly());
        assert!(!tracker.should_mark_complete(2));
    }

    #[test]
    fn redoing_an_overridden_set_restores_properness() {
        let mut tracker = CompletionTracker::new(2);
        tracker.record(1, SetOutcome::Overridden);
        tracker.clear(1);
        assert!(tracker.all_sets_completed_properly());

        tracker.record(1, SetOutcome::Completed);
        tracker.record(2, SetOutcome::Completed);
        assert!(tracker.should_mark_complete(2));
    }

    #[test]
    fn recording_twice_does_not_double_count() {
        let mut tracker = CompletionTracker::new(1);
        tracker.record(1, SetOutcome::Completed);
        tracker.record(1, SetOutcome::Completed);
        assert_eq!(tracker.completed_sets(), 1);
    }

    #[test]
    fn out_of_range_sets_are_ignored() {
        let mut tracker = CompletionTracker::new(1);
        tracker.record(0, SetOutcome::Completed);
        tracker.record(5, SetOutcome::Completed);
        tracker.clear(0);
        assert_eq!(tracker.completed_sets(), 0);
    }
}
