//! Scale and chord construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::note::Note;

/// Semitone steps of the major scale, root through octave.
pub const MAJOR_INTERVALS: [i32; 8] = [0, 2, 4, 5, 7, 9, 11, 12];

/// Semitone steps of the natural minor scale, root through octave.
pub const MINOR_INTERVALS: [i32; 8] = [0, 2, 3, 5, 7, 8, 10, 12];

/// Octave shifts tried by [`optimal_chord_inversion`], in tie-break order.
const INVERSION_OCTAVES: [i32; 3] = [-1, 0, 1];

/// Major or minor triad quality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordQuality {
    #[default]
    Major,
    Minor,
}

impl ChordQuality {
    pub fn is_minor(self) -> bool {
        self == ChordQuality::Minor
    }

    /// The other quality.
    pub fn toggled(self) -> Self {
        match self {
            ChordQuality::Major => ChordQuality::Minor,
            ChordQuality::Minor => ChordQuality::Major,
        }
    }

    /// Short label drawn on keys: empty for major, `"m"` for minor.
    pub fn label(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
        }
    }
}

/// Errors from the chord helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TheoryError {
    /// A chord degree outside `1..=len` of the scale it picks from.
    DegreeOutOfRange { degree: usize, len: usize },
}

impl fmt::Display for TheoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TheoryError::DegreeOutOfRange { degree, len } => {
                write!(f, "Scale degree {} out of range 1..={}", degree, len)
            }
        }
    }
}

impl std::error::Error for TheoryError {}

/// Build the 8-note diatonic scale starting at `root`.
///
/// Major by default; `minor` substitutes the natural-minor third, sixth and
/// seventh.
pub fn make_scale(root: Note, minor: bool) -> [Note; 8] {
    let intervals = if minor { &MINOR_INTERVALS } else { &MAJOR_INTERVALS };
    intervals.map(|step| root.transpose(step))
}

/// Pick 1-indexed degrees out of a scale.
pub fn try_make_chord(scale: &[Note], degrees: &[usize]) -> Result<Vec<Note>, TheoryError> {
    degrees
        .iter()
        .map(|&degree| {
            degree
                .checked_sub(1)
                .and_then(|i| scale.get(i))
                .copied()
                .ok_or(TheoryError::DegreeOutOfRange {
                    degree,
                    len: scale.len(),
                })
        })
        .collect()
}

/// Pick 1-indexed degrees out of a scale, e.g. `[1, 3, 5]` for a triad.
///
/// # Panics
///
/// Panics when a degree is 0 or larger than the scale. Degrees are a closed
/// vocabulary chosen by the caller; use [`try_make_chord`] for untrusted input.
pub fn make_chord(scale: &[Note], degrees: &[usize]) -> Vec<Note> {
    match try_make_chord(scale, degrees) {
        Ok(chord) => chord,
        Err(e) => panic!("{}", e),
    }
}

/// Move every chord note into the octave closest to `center`.
///
/// Candidates are tried one octave below, at, and above the center's octave;
/// the first candidate with the smallest distance wins.
pub fn optimal_chord_inversion(chord: &[Note], center: Note) -> Vec<Note> {
    chord
        .iter()
        .map(|note| {
            let mut best: Option<(Note, i32)> = None;
            for shift in INVERSION_OCTAVES {
                let candidate = Note::new(note.pitch, center.octave + shift);
                let dist = candidate.distance_to(center).abs();
                if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                    best = Some((candidate, dist));
                }
            }
            best.map_or(*note, |(candidate, _)| candidate)
        })
        .collect()
}
