//! Note-set diffing.
//!
//! Turns two snapshots of sounding notes into the attack/release events
//! needed to move from one to the other.

use std::collections::BTreeSet;

use super::note::Note;

/// Notes that started and stopped sounding between two snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteDiff {
    /// In `after` but not in `before`.
    pub added: BTreeSet<Note>,
    /// In `before` but not in `after`.
    pub removed: BTreeSet<Note>,
}

impl NoteDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Set difference in both directions. Order and duplicates in the inputs
/// do not matter.
pub fn diff_notes(before: &[Note], after: &[Note]) -> NoteDiff {
    let before: BTreeSet<Note> = before.iter().copied().collect();
    let after: BTreeSet<Note> = after.iter().copied().collect();
    NoteDiff {
        added: after.difference(&before).copied().collect(),
        removed: before.difference(&after).copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(list: &[&str]) -> Vec<Note> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn set(list: &[&str]) -> BTreeSet<Note> {
        notes(list).into_iter().collect()
    }

    #[test]
    fn test_diff_added_and_removed() {
        let diff = diff_notes(&notes(&["C4", "E4"]), &notes(&["E4", "G4"]));
        assert_eq!(diff.added, set(&["G4"]));
        assert_eq!(diff.removed, set(&["C4"]));
    }

    #[test]
    fn test_diff_is_idempotent() {
        let x = notes(&["C4", "E4", "G4"]);
        let diff = diff_notes(&x, &x);
        assert!(diff.is_empty());
        assert_eq!(diff, NoteDiff::default());
    }

    #[test]
    fn test_diff_ignores_order_and_duplicates() {
        let diff = diff_notes(&notes(&["G4", "C4", "C4"]), &notes(&["C4", "G4", "G4"]));
        assert!(diff.is_empty());

        let diff = diff_notes(&[], &notes(&["C4", "C4", "E4"]));
        assert_eq!(diff.added, set(&["C4", "E4"]));
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_octaves_are_distinct_notes() {
        let diff = diff_notes(&notes(&["C4"]), &notes(&["C5"]));
        assert_eq!(diff.added, set(&["C5"]));
        assert_eq!(diff.removed, set(&["C4"]));
    }
}
