//! Translates pressed keys into sounding notes.

use std::collections::{BTreeMap, BTreeSet};

use super::chord_mode::ChordMode;
use crate::instrument::Instrument;
use crate::theory::{diff_notes, Note, PitchClass};

/// Sits between the keyboards and the sound source.
///
/// Keyboards call it as an [`Instrument`]. It keeps the pressed notes, turns
/// them into the sounding set (through [`ChordMode`] when enabled) and
/// forwards only the difference to the wrapped instrument.
#[derive(Debug)]
pub struct NotePerformer<I: Instrument> {
    instrument: I,
    chord_mode: ChordMode,
    chords_enabled: bool,
    editing_chords: bool,
    /// Pressed notes with the number of keyboards holding them.
    down: BTreeMap<Note, usize>,
    /// Notes in press order; the order chord expansion sees.
    down_order: Vec<Note>,
    active: BTreeSet<Note>,
}

impl<I: Instrument> NotePerformer<I> {
    pub fn new(instrument: I) -> Self {
        Self {
            instrument,
            chord_mode: ChordMode::default(),
            chords_enabled: false,
            editing_chords: false,
            down: BTreeMap::new(),
            down_order: Vec::new(),
            active: BTreeSet::new(),
        }
    }

    pub fn instrument(&self) -> &I {
        &self.instrument
    }

    pub fn instrument_mut(&mut self) -> &mut I {
        &mut self.instrument
    }

    pub fn chord_mode(&self) -> &ChordMode {
        &self.chord_mode
    }

    pub fn set_chord_mode(&mut self, chord_mode: ChordMode) {
        self.chord_mode = chord_mode;
        self.refresh();
    }

    pub fn chords_enabled(&self) -> bool {
        self.chords_enabled
    }

    /// Turning chords off also leaves chord editing.
    pub fn set_chords_enabled(&mut self, enabled: bool) {
        if self.chords_enabled == enabled {
            return;
        }
        self.chords_enabled = enabled;
        if !enabled {
            self.editing_chords = false;
        }
        log::debug!("chord mode {}", if enabled { "on" } else { "off" });
        self.refresh();
    }

    pub fn editing_chords(&self) -> bool {
        self.editing_chords
    }

    /// Editing only applies while chords are enabled.
    pub fn set_editing_chords(&mut self, editing: bool) {
        self.editing_chords = editing && self.chords_enabled;
    }

    /// Flip a root between major and minor and re-voice held chords.
    pub fn toggle_quality(&mut self, pitch: PitchClass) {
        let quality = self.chord_mode.toggle_quality(pitch);
        log::debug!("{} chords are now {:?}", pitch, quality);
        self.refresh();
    }

    /// Notes currently sounding, used to highlight keys.
    pub fn active_notes(&self) -> &BTreeSet<Note> {
        &self.active
    }

    pub fn is_active(&self, note: Note) -> bool {
        self.active.contains(&note)
    }

    /// Chord labels to draw on keys, shown only while editing chords.
    pub fn annotations(&self) -> BTreeMap<Note, String> {
        if self.editing_chords {
            self.chord_mode.annotations()
        } else {
            BTreeMap::new()
        }
    }

    /// Release everything and forget the held keys.
    pub fn silence(&mut self) {
        self.down.clear();
        self.down_order.clear();
        self.refresh();
    }

    fn refresh(&mut self) {
        let next: Vec<Note> = if self.chords_enabled {
            self.chord_mode.expand(&self.down_order)
        } else {
            self.down_order.clone()
        };
        let previous: Vec<Note> = self.active.iter().copied().collect();
        let diff = diff_notes(&previous, &next);
        for &note in &diff.removed {
            self.instrument.trigger_release(note);
        }
        for &note in &diff.added {
            self.instrument.trigger_attack(note);
        }
        self.active = next.into_iter().collect();
    }
}

impl<I: Instrument> Instrument for NotePerformer<I> {
    fn trigger_attack(&mut self, note: Note) {
        let holders = self.down.entry(note).or_insert(0);
        *holders += 1;
        if *holders == 1 {
            self.down_order.push(note);
        }
        if self.editing_chords {
            self.chord_mode.toggle_quality(note.pitch);
        }
        self.refresh();
    }

    fn trigger_release(&mut self, note: Note) {
        let Some(holders) = self.down.get_mut(&note) else {
            return;
        };
        *holders -= 1;
        if *holders == 0 {
            self.down.remove(&note);
            self.down_order.retain(|&n| n != note);
        }
        self.refresh();
    }
}
