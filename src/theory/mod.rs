//! Theory module
//!
//! Note arithmetic, scales, chords and note-set diffing. Everything here is
//! pure and works on [`Note`] values.

pub mod diff;
pub mod note;
pub mod scale;

pub use diff::{diff_notes, NoteDiff};
pub use note::{offset_to_note, parse_note, Note, NoteError, PitchClass};
pub use scale::{
    make_chord, make_scale, optimal_chord_inversion, try_make_chord, ChordQuality, TheoryError,
};
