//! Multi-pointer tracking.
//!
//! Every active pointer (mouse button, finger) maps to the single note it
//! touches. Several pointers may hold the same note; the note is attacked when
//! the first one arrives and released when the last one leaves.

use std::collections::{BTreeMap, BTreeSet};

use crate::instrument::Instrument;
use crate::theory::Note;

/// Identifier of a pointer, unique while the pointer is active.
pub type PointerId = u64;

/// Pointer id used for the mouse.
pub const MOUSE_POINTER_ID: PointerId = 0;

/// Pointer → note map with per-note reference counting.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    pointers: BTreeMap<PointerId, Note>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pointer went down on `note` (`None` when it missed every key).
    ///
    /// A down for a pointer that is already tracked is handled like a move.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        note: Option<Note>,
        instrument: &mut impl Instrument,
    ) {
        if self.pointers.contains_key(&pointer) {
            self.pointer_move(pointer, note, instrument);
            return;
        }
        if let Some(note) = note {
            self.press(pointer, note, instrument);
        }
    }

    /// A tracked pointer moved onto `note` (`None` when it left every key).
    ///
    /// Pointers that are not holding a note are ignored: sliding onto the
    /// keyboard from outside does not play anything.
    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        note: Option<Note>,
        instrument: &mut impl Instrument,
    ) {
        let Some(&previous) = self.pointers.get(&pointer) else {
            return;
        };
        if note == Some(previous) {
            return;
        }
        self.release(pointer, instrument);
        if let Some(note) = note {
            self.press(pointer, note, instrument);
        }
    }

    /// A pointer was lifted.
    pub fn pointer_up(&mut self, pointer: PointerId, instrument: &mut impl Instrument) {
        self.release(pointer, instrument);
    }

    /// The platform cancelled a pointer. Same as lifting it.
    pub fn pointer_cancel(&mut self, pointer: PointerId, instrument: &mut impl Instrument) {
        self.release(pointer, instrument);
    }

    /// Lift every pointer.
    pub fn release_all(&mut self, instrument: &mut impl Instrument) {
        let ids: Vec<PointerId> = self.pointers.keys().copied().collect();
        for id in ids {
            self.release(id, instrument);
        }
    }

    /// Number of pointers currently holding `note`.
    pub fn holders(&self, note: Note) -> usize {
        self.pointers.values().filter(|&&n| n == note).count()
    }

    /// Note held by a pointer.
    pub fn note_for(&self, pointer: PointerId) -> Option<Note> {
        self.pointers.get(&pointer).copied()
    }

    /// Notes held by at least one pointer.
    pub fn pressed_notes(&self) -> BTreeSet<Note> {
        self.pointers.values().copied().collect()
    }

    pub fn is_pressed(&self, note: Note) -> bool {
        self.pointers.values().any(|&n| n == note)
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    fn press(&mut self, pointer: PointerId, note: Note, instrument: &mut impl Instrument) {
        let already_held = self.is_pressed(note);
        self.pointers.insert(pointer, note);
        if !already_held {
            log::debug!("note on {} (pointer {})", note, pointer);
            instrument.trigger_attack(note);
        }
    }

    fn release(&mut self, pointer: PointerId, instrument: &mut impl Instrument) {
        let Some(note) = self.pointers.remove(&pointer) else {
            return;
        };
        if !self.is_pressed(note) {
            log::debug!("note off {} (pointer {})", note, pointer);
            instrument.trigger_release(note);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::NoteEvent;

    fn n(s: &str) -> Note {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_pointer_press_and_release() {
        let mut tracker = PointerTracker::new();
        let mut events: Vec<NoteEvent> = Vec::new();

        tracker.pointer_down(1, Some(n("C4")), &mut events);
        assert!(tracker.is_pressed(n("C4")));
        tracker.pointer_up(1, &mut events);

        assert_eq!(events, vec![NoteEvent::on(n("C4")), NoteEvent::off(n("C4"))]);
        assert_eq!(tracker.active_pointers(), 0);
    }

    #[test]
    fn test_two_pointers_share_one_note() {
        let mut tracker = PointerTracker::new();
        let mut events: Vec<NoteEvent> = Vec::new();

        tracker.pointer_down(1, Some(n("E4")), &mut events);
        tracker.pointer_down(2, Some(n("E4")), &mut events);
        assert_eq!(tracker.holders(n("E4")), 2);
        assert_eq!(events, vec![NoteEvent::on(n("E4"))]);

        // releasing one finger mid-chord is silent
        tracker.pointer_up(1, &mut events);
        assert_eq!(events.len(), 1);
        assert!(tracker.is_pressed(n("E4")));

        tracker.pointer_up(2, &mut events);
        assert_eq!(events, vec![NoteEvent::on(n("E4")), NoteEvent::off(n("E4"))]);
    }

    #[test]
    fn test_move_between_keys() {
        let mut tracker = PointerTracker::new();
        let mut events: Vec<NoteEvent> = Vec::new();

        tracker.pointer_down(7, Some(n("C4")), &mut events);
        tracker.pointer_move(7, Some(n("C4")), &mut events);
        tracker.pointer_move(7, Some(n("D4")), &mut events);

        assert_eq!(
            events,
            vec![
                NoteEvent::on(n("C4")),
                NoteEvent::off(n("C4")),
                NoteEvent::on(n("D4")),
            ]
        );
        assert_eq!(tracker.note_for(7), Some(n("D4")));
    }

    #[test]
    fn test_move_onto_note_held_by_other_pointer() {
        let mut tracker = PointerTracker::new();
        let mut events: Vec<NoteEvent> = Vec::new();

        tracker.pointer_down(1, Some(n("G4")), &mut events);
        tracker.pointer_down(2, Some(n("A4")), &mut events);
        tracker.pointer_move(2, Some(n("G4")), &mut events);

        assert_eq!(
            events,
            vec![
                NoteEvent::on(n("G4")),
                NoteEvent::on(n("A4")),
                NoteEvent::off(n("A4")),
            ]
        );
        assert_eq!(tracker.holders(n("G4")), 2);

        // moving off a shared note keeps it sounding
        tracker.pointer_move(1, Some(n("B4")), &mut events);
        assert_eq!(events.last(), Some(&NoteEvent::on(n("B4"))));
        assert!(tracker.is_pressed(n("G4")));
    }

    #[test]
    fn test_move_off_keyboard_releases_and_untracks() {
        let mut tracker = PointerTracker::new();
        let mut events: Vec<NoteEvent> = Vec::new();

        tracker.pointer_down(3, Some(n("F4")), &mut events);
        tracker.pointer_move(3, None, &mut events);
        assert_eq!(events, vec![NoteEvent::on(n("F4")), NoteEvent::off(n("F4"))]);
        assert_eq!(tracker.note_for(3), None);

        // coming back does not play: the pointer is no longer pressing
        tracker.pointer_move(3, Some(n("F4")), &mut events);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_down_outside_keys_and_stray_events() {
        let mut tracker = PointerTracker::new();
        let mut events: Vec<NoteEvent> = Vec::new();

        tracker.pointer_down(1, None, &mut events);
        tracker.pointer_move(1, Some(n("C4")), &mut events);
        tracker.pointer_up(1, &mut events);
        tracker.pointer_cancel(99, &mut events);

        assert!(events.is_empty());
        assert_eq!(tracker.active_pointers(), 0);
    }

    #[test]
    fn test_cancel_releases_like_up() {
        let mut tracker = PointerTracker::new();
        let mut events: Vec<NoteEvent> = Vec::new();

        tracker.pointer_down(1, Some(n("C#5")), &mut events);
        tracker.pointer_cancel(1, &mut events);
        assert_eq!(events, vec![NoteEvent::on(n("C#5")), NoteEvent::off(n("C#5"))]);
    }

    #[test]
    fn test_repeated_down_acts_as_move() {
        let mut tracker = PointerTracker::new();
        let mut events: Vec<NoteEvent> = Vec::new();

        tracker.pointer_down(1, Some(n("C4")), &mut events);
        tracker.pointer_down(1, Some(n("D4")), &mut events);
        tracker.pointer_up(1, &mut events);

        assert_eq!(
            events,
            vec![
                NoteEvent::on(n("C4")),
                NoteEvent::off(n("C4")),
                NoteEvent::on(n("D4")),
                NoteEvent::off(n("D4")),
            ]
        );
    }

    #[test]
    fn test_release_all() {
        let mut tracker = PointerTracker::new();
        let mut events: Vec<NoteEvent> = Vec::new();

        tracker.pointer_down(1, Some(n("C4")), &mut events);
        tracker.pointer_down(2, Some(n("C4")), &mut events);
        tracker.pointer_down(3, Some(n("E4")), &mut events);
        events.clear();

        tracker.release_all(&mut events);
        assert_eq!(events, vec![NoteEvent::off(n("C4")), NoteEvent::off(n("E4"))]);
        assert!(tracker.pressed_notes().is_empty());
    }

    #[test]
    fn test_attack_release_balance_under_random_walk() {
        let notes = [n("C4"), n("D4"), n("E4")];
        let mut tracker = PointerTracker::new();
        let mut events: Vec<NoteEvent> = Vec::new();

        // deterministic pseudo-random sequence over 4 pointers and 3 notes + "miss"
        let mut state: u32 = 12345;
        for _ in 0..500 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let pointer = (state >> 16) as u64 % 4;
            let choice = (state >> 8) as usize % 4;
            let note = notes.get(choice).copied();
            match (state >> 4) % 3 {
                0 => tracker.pointer_down(pointer, note, &mut events),
                1 => tracker.pointer_move(pointer, note, &mut events),
                _ => tracker.pointer_up(pointer, &mut events),
            }

            for &note in &notes {
                let ons = events.iter().filter(|e| **e == NoteEvent::on(note)).count();
                let offs = events.iter().filter(|e| **e == NoteEvent::off(note)).count();
                let sounding = if tracker.is_pressed(note) { 1 } else { 0 };
                assert_eq!(ons, offs + sounding);
            }
        }
    }
}
