//! Polyphonic voice bank rendered inside the audio callback.

use super::channels::ToneCommand;
use super::presets::{default_preset, InstrumentPreset};

/// Maximum number of simultaneously sounding voices.
pub const MAX_VOICES: usize = 32;

/// Level below which a releasing voice is considered silent.
const LEVEL_THRESHOLD: f32 = 0.0001;

/// Envelope stage of one voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceStage {
    Idle,
    Attack,
    Sustain,
    Release,
}

#[derive(Clone, Copy, Debug)]
struct Voice {
    key: i32,
    frequency: f32,
    phase: f32,
    level: f32,
    stage: VoiceStage,
    /// Start order, used to pick the voice to steal.
    started: u64,
}

impl Voice {
    const IDLE: Voice = Voice {
        key: 0,
        frequency: 0.0,
        phase: 0.0,
        level: 0.0,
        stage: VoiceStage::Idle,
        started: 0,
    };

    fn is_idle(&self) -> bool {
        self.stage == VoiceStage::Idle
    }
}

/// Fixed set of voices. Nothing here allocates after construction.
pub struct VoiceBank {
    voices: [Voice; MAX_VOICES],
    preset: &'static InstrumentPreset,
    sample_rate: f32,
    attack_coeff: f32,
    release_coeff: f32,
    next_start: u64,
}

impl VoiceBank {
    pub fn new(sample_rate: f32) -> Self {
        let mut bank = Self {
            voices: [Voice::IDLE; MAX_VOICES],
            preset: default_preset(),
            sample_rate,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            next_start: 0,
        };
        bank.update_coefficients();
        bank
    }

    pub fn preset(&self) -> &'static InstrumentPreset {
        self.preset
    }

    /// Takes effect for new notes; sounding voices keep their phase and level.
    pub fn set_preset(&mut self, preset: &'static InstrumentPreset) {
        self.preset = preset;
        self.update_coefficients();
    }

    /// Apply one queued command.
    pub fn handle(&mut self, cmd: ToneCommand) {
        match cmd {
            ToneCommand::NoteOn { key, frequency } => self.note_on(key, frequency),
            ToneCommand::NoteOff { key } => self.note_off(key),
            ToneCommand::AllNotesOff => self.all_notes_off(),
            ToneCommand::SetPreset(preset) => self.set_preset(preset),
        }
    }

    /// Start a note. A voice already playing `key` is restarted; otherwise a
    /// free voice is used, or the oldest one is stolen.
    pub fn note_on(&mut self, key: i32, frequency: f32) {
        let index = self
            .voices
            .iter()
            .position(|v| !v.is_idle() && v.key == key)
            .or_else(|| self.voices.iter().position(Voice::is_idle))
            .unwrap_or_else(|| self.oldest_voice());

        let voice = &mut self.voices[index];
        if voice.key != key || voice.is_idle() {
            voice.phase = 0.0;
            voice.level = 0.0;
        }
        voice.key = key;
        voice.frequency = frequency;
        voice.stage = VoiceStage::Attack;
        voice.started = self.next_start;
        self.next_start += 1;
    }

    pub fn note_off(&mut self, key: i32) {
        for voice in self.voices.iter_mut() {
            if voice.key == key && matches!(voice.stage, VoiceStage::Attack | VoiceStage::Sustain) {
                voice.stage = VoiceStage::Release;
            }
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in self.voices.iter_mut().filter(|v| !v.is_idle()) {
            voice.stage = VoiceStage::Release;
        }
    }

    /// Number of voices that are not idle, releasing ones included.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_idle()).count()
    }

    /// Stage of the voice playing `key`, if any.
    pub fn stage_of(&self, key: i32) -> Option<VoiceStage> {
        self.voices
            .iter()
            .find(|v| !v.is_idle() && v.key == key)
            .map(|v| v.stage)
    }

    /// Mix every voice into an interleaved buffer, overwriting it.
    ///
    /// Real-time safe: no allocations, no locks.
    pub fn render(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let waveform = self.preset.waveform;
        let gain = self.preset.gain;

        for frame in data.chunks_mut(channels) {
            let mut mix = 0.0;
            for voice in self.voices.iter_mut().filter(|v| !v.is_idle()) {
                match voice.stage {
                    VoiceStage::Attack => {
                        voice.level = 1.0 - (1.0 - voice.level) * self.attack_coeff;
                        if voice.level >= 1.0 - LEVEL_THRESHOLD {
                            voice.level = 1.0;
                            voice.stage = VoiceStage::Sustain;
                        }
                    }
                    VoiceStage::Release => {
                        voice.level *= self.release_coeff;
                        if voice.level < LEVEL_THRESHOLD {
                            voice.level = 0.0;
                            voice.stage = VoiceStage::Idle;
                        }
                    }
                    VoiceStage::Sustain | VoiceStage::Idle => {}
                }

                mix += waveform.sample(voice.phase) * voice.level * gain;

                voice.phase = (voice.phase + voice.frequency / self.sample_rate).fract();
            }

            let sample = mix.clamp(-1.0, 1.0);
            for out in frame.iter_mut() {
                *out = sample;
            }
        }
    }

    fn oldest_voice(&self) -> usize {
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.started)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn update_coefficients(&mut self) {
        self.attack_coeff = envelope_coeff(self.preset.attack, self.sample_rate);
        self.release_coeff = envelope_coeff(self.preset.release, self.sample_rate);
    }
}

/// One-pole coefficient reaching ~99.3% of the target in `time_seconds`.
fn envelope_coeff(time_seconds: f32, sample_rate: f32) -> f32 {
    let samples = time_seconds * sample_rate;
    if samples <= 1.0 {
        return 0.0;
    }
    (-5.0_f32 / samples).exp()
}
