//! Note model.
//!
//! A [`Note`] is a sharp-spelled pitch class plus a signed octave. Notes are
//! written in their canonical string form (`"C4"`, `"F#3"`, `"A-1"`) wherever
//! they cross the boundary to the UI or to the settings file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of semitones in an octave.
pub const SEMITONES_PER_OCTAVE: i32 = 12;

/// Number of white keys in an octave.
pub const WHITE_KEYS_PER_OCTAVE: i32 = 7;

/// One of the 12 chromatic pitch classes, spelled with sharps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "B")]
    B,
}

impl PitchClass {
    /// Chromatic ordering, C first.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// The white-key pitch classes in keyboard order.
    pub const WHITE: [PitchClass; 7] = [
        PitchClass::C,
        PitchClass::D,
        PitchClass::E,
        PitchClass::F,
        PitchClass::G,
        PitchClass::A,
        PitchClass::B,
    ];

    /// Position in the chromatic ordering (C = 0, B = 11).
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Pitch class at a chromatic position, wrapping modulo 12.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(SEMITONES_PER_OCTAVE) as usize]
    }

    /// Sharp-spelled name, e.g. `"F#"`.
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Parse a pitch-class name. Only sharp spellings are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|pc| pc.name() == name)
    }

    /// Whether this pitch class is played on a black key.
    pub fn is_black(self) -> bool {
        matches!(
            self,
            PitchClass::CSharp
                | PitchClass::DSharp
                | PitchClass::FSharp
                | PitchClass::GSharp
                | PitchClass::ASharp
        )
    }

    /// Index among the white keys of an octave, `None` for black keys.
    pub fn white_index(self) -> Option<i32> {
        Self::WHITE
            .iter()
            .position(|&pc| pc == self)
            .map(|i| i as i32)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced when reading notes from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    /// The string has no trailing octave number or an unknown pitch-class name.
    MalformedNoteString(String),
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteError::MalformedNoteString(s) => write!(f, "Malformed note string: {:?}", s),
        }
    }
}

impl std::error::Error for NoteError {}

/// An absolute note: pitch class and octave.
///
/// Middle C is `C4`. Octaves are unbounded; transposing far enough produces
/// octaves that no instrument can play, which is left to the instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Note {
    pub pitch: PitchClass,
    pub octave: i32,
}

impl Note {
    pub const fn new(pitch: PitchClass, octave: i32) -> Self {
        Self { pitch, octave }
    }

    /// Semitone count from C0.
    pub fn semitones(self) -> i32 {
        self.octave * SEMITONES_PER_OCTAVE + self.pitch.index()
    }

    /// Inverse of [`Note::semitones`].
    pub fn from_semitones(semitones: i32) -> Self {
        Self {
            pitch: PitchClass::from_index(semitones),
            octave: semitones.div_euclid(SEMITONES_PER_OCTAVE),
        }
    }

    /// Signed semitone distance from `self` to `other`.
    pub fn distance_to(self, other: Note) -> i32 {
        (other.octave - self.octave) * SEMITONES_PER_OCTAVE + other.pitch.index()
            - self.pitch.index()
    }

    /// Transpose by a signed number of semitones.
    ///
    /// The pitch class wraps modulo 12 and the octave carries with floor
    /// division, so `B3 + 1 = C4` and `C4 - 1 = B3`.
    pub fn transpose(self, semitones: i32) -> Note {
        let index = self.pitch.index() + semitones;
        Note {
            pitch: PitchClass::from_index(index),
            octave: self.octave + index.div_euclid(SEMITONES_PER_OCTAVE),
        }
    }

    /// The next chromatic note.
    pub fn next(self) -> Note {
        self.transpose(1)
    }

    pub fn is_black(self) -> bool {
        self.pitch.is_black()
    }

    /// White-key offset of this note (7 per octave, `C0` = 0).
    /// Black keys have no offset of their own.
    pub fn white_key_offset(self) -> Option<i32> {
        self.pitch
            .white_index()
            .map(|i| self.octave * WHITE_KEYS_PER_OCTAVE + i)
    }

    /// MIDI note number (C4 = 60). May fall outside 0..=127.
    pub fn midi_number(self) -> i32 {
        self.semitones() + SEMITONES_PER_OCTAVE
    }

    /// Equal-tempered frequency in Hz (A4 = 440 Hz).
    pub fn frequency(self) -> f32 {
        440.0 * 2.0_f32.powf((self.midi_number() - 69) as f32 / 12.0)
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.semitones().cmp(&other.semitones())
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch.name(), self.octave)
    }
}

impl FromStr for Note {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_note(s).ok_or_else(|| NoteError::MalformedNoteString(s.to_string()))
    }
}

impl Serialize for Note {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Split a canonical note string into pitch class and octave.
///
/// Returns `None` when the string has no trailing octave number or the
/// leading name is not one of the 12 sharp-spelled pitch classes.
pub fn parse_note(s: &str) -> Option<Note> {
    let digits_start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;

    let (head, digits) = s.split_at(digits_start);
    let (name, negative) = match head.strip_suffix('-') {
        Some(name) => (name, true),
        None => (head, false),
    };

    let pitch = PitchClass::from_name(name)?;
    let magnitude: i32 = digits.parse().ok()?;
    let octave = if negative { -magnitude } else { magnitude };
    Some(Note { pitch, octave })
}

/// Map a white-key offset to the white note it falls on.
///
/// Every 7 units is one octave; fractional offsets are floored.
pub fn offset_to_note(offset: f32) -> Note {
    let whole = offset.floor() as i32;
    let octave = whole.div_euclid(WHITE_KEYS_PER_OCTAVE);
    let pitch = PitchClass::WHITE[whole.rem_euclid(WHITE_KEYS_PER_OCTAVE) as usize];
    Note { pitch, octave }
}
