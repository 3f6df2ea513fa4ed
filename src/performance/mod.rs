//! Performance module
//!
//! Everything between a key press and the instrument: chord expansion and the
//! performer that diffs sounding notes.

pub mod chord_mode;
pub mod performer;

pub use chord_mode::{ChordMode, DEFAULT_VOICING_CENTER};
pub use performer::NotePerformer;
