//! Instrument module
//!
//! The [`Instrument`] capability the keyboard plays into, plus the built-in
//! tone instrument: presets, voice rendering, the cpal output stream and the
//! lock-free command queue feeding it.

pub mod channels;
pub mod presets;
pub mod tone_engine;
pub mod voice;

pub use channels::{ToneChannels, ToneCommand, ToneReceiver, ToneSender, DEFAULT_COMMAND_BUFFER_SIZE};
pub use presets::{
    categories, default_preset, find_preset, presets_in, InstrumentPreset, Waveform, PRESETS,
};
pub use tone_engine::{AudioError, ToneEngine, ToneInstrument};
pub use voice::{VoiceBank, VoiceStage, MAX_VOICES};

use crate::theory::Note;

/// Something that can start and stop notes.
///
/// Calls are balanced by the caller: every `trigger_release` follows a
/// `trigger_attack` of the same note.
pub trait Instrument {
    fn trigger_attack(&mut self, note: Note);
    fn trigger_release(&mut self, note: Note);
}

/// Whether a [`NoteEvent`] starts or stops a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEventKind {
    On,
    Off,
}

/// A recorded attack or release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteEvent {
    pub note: Note,
    pub kind: NoteEventKind,
}

impl NoteEvent {
    pub fn on(note: Note) -> Self {
        Self {
            note,
            kind: NoteEventKind::On,
        }
    }

    pub fn off(note: Note) -> Self {
        Self {
            note,
            kind: NoteEventKind::Off,
        }
    }
}

/// Records events instead of playing them.
impl Instrument for Vec<NoteEvent> {
    fn trigger_attack(&mut self, note: Note) {
        self.push(NoteEvent::on(note));
    }

    fn trigger_release(&mut self, note: Note) {
        self.push(NoteEvent::off(note));
    }
}

impl<I: Instrument + ?Sized> Instrument for &mut I {
    fn trigger_attack(&mut self, note: Note) {
        (**self).trigger_attack(note);
    }

    fn trigger_release(&mut self, note: Note) {
        (**self).trigger_release(note);
    }
}

/// `None` plays nothing, e.g. when no audio device could be opened.
impl<I: Instrument> Instrument for Option<I> {
    fn trigger_attack(&mut self, note: Note) {
        if let Some(instrument) = self {
            instrument.trigger_attack(note);
        }
    }

    fn trigger_release(&mut self, note: Note) {
        if let Some(instrument) = self {
            instrument.trigger_release(note);
        }
    }
}

impl<I: Instrument + ?Sized> Instrument for Box<I> {
    fn trigger_attack(&mut self, note: Note) {
        (**self).trigger_attack(note);
    }

    fn trigger_release(&mut self, note: Note) {
        (**self).trigger_release(note);
    }
}
