//! Instrument presets.
//!
//! The picker lists these grouped by category. Each preset is a waveform
//! plus an attack/release envelope for the tone engine.

use std::f32::consts::TAU;

/// Oscillator shape used by a preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Saw,
}

impl Waveform {
    /// One sample at `phase` in `[0, 1)`, range -1..1.
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Saw => 2.0 * phase - 1.0,
        }
    }
}

/// A selectable instrument.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstrumentPreset {
    /// Stable id stored in the settings file.
    pub id: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub waveform: Waveform,
    /// Attack time in seconds.
    pub attack: f32,
    /// Release time in seconds.
    pub release: f32,
    /// Per-voice output gain.
    pub gain: f32,
}

impl InstrumentPreset {
    const fn new(
        id: &'static str,
        title: &'static str,
        category: &'static str,
        waveform: Waveform,
        attack: f32,
        release: f32,
        gain: f32,
    ) -> Self {
        Self {
            id,
            title,
            category,
            waveform,
            attack,
            release,
            gain,
        }
    }
}

/// Built-in presets. The first one is the default instrument.
pub static PRESETS: &[InstrumentPreset] = &[
    // Keyboard
    InstrumentPreset::new("piano", "Piano", "Keyboard", Waveform::Triangle, 0.005, 0.9, 0.30),
    InstrumentPreset::new("electric_piano", "Electric Piano", "Keyboard", Waveform::Sine, 0.005, 0.7, 0.35),
    InstrumentPreset::new("poly_synth", "PolySynth", "Keyboard", Waveform::Square, 0.05, 0.8, 0.12),
    InstrumentPreset::new("organ", "Organ", "Keyboard", Waveform::Square, 0.01, 0.08, 0.12),
    InstrumentPreset::new("xylophone", "Xylophone", "Keyboard", Waveform::Sine, 0.001, 0.35, 0.40),
    // String
    InstrumentPreset::new("cello", "Cello", "String", Waveform::Saw, 0.12, 0.5, 0.14),
    InstrumentPreset::new("violin", "Violin", "String", Waveform::Saw, 0.08, 0.4, 0.12),
    // Guitar
    InstrumentPreset::new("electric_bass", "Electric Bass", "Guitar", Waveform::Triangle, 0.005, 0.3, 0.35),
    InstrumentPreset::new("nylon_guitar", "Nylon Guitar", "Guitar", Waveform::Triangle, 0.002, 0.6, 0.28),
    InstrumentPreset::new("harp", "Harp", "Guitar", Waveform::Sine, 0.002, 1.2, 0.35),
    // Woodwind
    InstrumentPreset::new("flute", "Flute", "Woodwind", Waveform::Sine, 0.06, 0.2, 0.35),
    InstrumentPreset::new("saxophone", "Saxophone", "Woodwind", Waveform::Square, 0.04, 0.2, 0.10),
    // Brass
    InstrumentPreset::new("french_horn", "French Horn", "Brass", Waveform::Saw, 0.08, 0.3, 0.12),
    InstrumentPreset::new("tuba", "Tuba", "Brass", Waveform::Triangle, 0.06, 0.25, 0.30),
];

/// The default preset.
pub fn default_preset() -> &'static InstrumentPreset {
    &PRESETS[0]
}

/// Distinct categories in catalog order.
pub fn categories() -> Vec<&'static str> {
    let mut categories: Vec<&'static str> = Vec::new();
    for preset in PRESETS {
        if !categories.contains(&preset.category) {
            categories.push(preset.category);
        }
    }
    categories
}

/// Presets of one category in catalog order.
pub fn presets_in(category: &str) -> impl Iterator<Item = &'static InstrumentPreset> + '_ {
    PRESETS.iter().filter(move |p| p.category == category)
}

pub fn find_preset(id: &str) -> Option<&'static InstrumentPreset> {
    PRESETS.iter().find(|p| p.id == id)
}
