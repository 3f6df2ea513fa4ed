//! Chord mode: every pressed key also plays a triad.

use std::collections::BTreeMap;

use crate::theory::{make_chord, make_scale, optimal_chord_inversion, ChordQuality, Note, PitchClass};

/// Lowest and highest octave that receive chord-quality labels.
const ANNOTATED_OCTAVES: std::ops::RangeInclusive<i32> = 1..=9;

/// Note the generated triads cluster around.
pub const DEFAULT_VOICING_CENTER: Note = Note::new(PitchClass::F, 4);

/// Expands pressed notes into chord voicings.
#[derive(Clone, Debug, PartialEq)]
pub struct ChordMode {
    qualities: BTreeMap<PitchClass, ChordQuality>,
    center: Note,
}

impl Default for ChordMode {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl ChordMode {
    pub fn new(qualities: BTreeMap<PitchClass, ChordQuality>) -> Self {
        Self {
            qualities,
            center: DEFAULT_VOICING_CENTER,
        }
    }

    pub fn with_center(mut self, center: Note) -> Self {
        self.center = center;
        self
    }

    /// Configured quality of a root; unset roots are major.
    pub fn quality(&self, pitch: PitchClass) -> ChordQuality {
        self.qualities.get(&pitch).copied().unwrap_or_default()
    }

    pub fn qualities(&self) -> &BTreeMap<PitchClass, ChordQuality> {
        &self.qualities
    }

    /// Flip a root between major and minor. Returns the new quality.
    pub fn toggle_quality(&mut self, pitch: PitchClass) -> ChordQuality {
        let quality = self.quality(pitch).toggled();
        self.qualities.insert(pitch, quality);
        quality
    }

    /// The triad played for `root`: the 1-3-5 of the scale an octave above,
    /// voiced around the center note.
    pub fn chord_for(&self, root: Note) -> Vec<Note> {
        let minor = self.quality(root.pitch).is_minor();
        let scale = make_scale(root.transpose(12), minor);
        let chord = make_chord(&scale, &[1, 3, 5]);
        optimal_chord_inversion(&chord, self.center)
    }

    /// Each pressed note followed by its triad. May contain duplicates.
    pub fn expand(&self, notes: &[Note]) -> Vec<Note> {
        let mut expanded = Vec::with_capacity(notes.len() * 4);
        for &note in notes {
            expanded.push(note);
            expanded.extend(self.chord_for(note));
        }
        expanded
    }

    /// Key labels for every configured root across the playable octaves.
    pub fn annotations(&self) -> BTreeMap<Note, String> {
        let mut labels = BTreeMap::new();
        for (&pitch, quality) in &self.qualities {
            for octave in ANNOTATED_OCTAVES {
                labels.insert(Note::new(pitch, octave), quality.label().to_string());
            }
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Note {
        s.parse().unwrap()
    }

    fn notes(list: &[&str]) -> Vec<Note> {
        list.iter().map(|s| n(s)).collect()
    }

    #[test]
    fn test_major_triad_voicing() {
        let mode = ChordMode::default();
        assert_eq!(mode.chord_for(n("C2")), notes(&["C4", "E4", "G4"]));
        assert_eq!(mode.expand(&notes(&["C2"])), notes(&["C2", "C4", "E4", "G4"]));
    }

    #[test]
    fn test_minor_triad_voicing() {
        let mut qualities = BTreeMap::new();
        qualities.insert(PitchClass::A, ChordQuality::Minor);
        let mode = ChordMode::new(qualities);
        // A minor: A C E, clustered around F4
        assert_eq!(mode.chord_for(n("A1")), notes(&["A4", "C4", "E4"]));
    }

    #[test]
    fn test_voicing_ignores_register_of_root() {
        let mode = ChordMode::default();
        assert_eq!(mode.chord_for(n("D1")), mode.chord_for(n("D6")));
    }

    #[test]
    fn test_toggle_quality() {
        let mut mode = ChordMode::default();
        assert_eq!(mode.quality(PitchClass::E), ChordQuality::Major);
        assert_eq!(mode.toggle_quality(PitchClass::E), ChordQuality::Minor);
        assert_eq!(mode.quality(PitchClass::E), ChordQuality::Minor);
        assert_eq!(mode.toggle_quality(PitchClass::E), ChordQuality::Major);
    }

    #[test]
    fn test_annotations_cover_octaves() {
        let mut mode = ChordMode::default();
        mode.toggle_quality(PitchClass::D);
        let labels = mode.annotations();
        assert_eq!(labels.len(), 9);
        assert_eq!(labels.get(&n("D1")).map(String::as_str), Some("m"));
        assert_eq!(labels.get(&n("D9")).map(String::as_str), Some("m"));
        assert!(labels.get(&n("D0")).is_none());

        mode.toggle_quality(PitchClass::D);
        assert_eq!(mode.annotations().get(&n("D4")).map(String::as_str), Some(""));
    }

    #[test]
    fn test_custom_center() {
        let mode = ChordMode::default().with_center(n("F2"));
        assert_eq!(mode.chord_for(n("C4")), notes(&["C2", "E2", "G2"]));
    }
}
