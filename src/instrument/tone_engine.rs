//! Tone Engine
//!
//! Owns the cpal output stream. The audio callback drains the command queue
//! into a [`VoiceBank`] and renders it; [`ToneInstrument`] is the UI-side
//! [`Instrument`] that fills the queue.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};

use super::channels::{ToneChannels, ToneCommand, ToneReceiver, ToneSender};
use super::presets::InstrumentPreset;
use super::voice::VoiceBank;
use super::Instrument;
use crate::theory::Note;

/// Errors that can occur while opening or driving the output stream.
#[derive(Debug, Clone)]
pub enum AudioError {
    /// No audio output device was found.
    NoOutputDevice,
    /// Failed to get device configuration.
    ConfigurationFailed(String),
    /// Failed to create the audio stream.
    StreamCreationFailed(String),
    /// Failed to start/stop playback.
    StreamPlaybackFailed(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "No audio output device found"),
            AudioError::ConfigurationFailed(msg) => {
                write!(f, "Failed to get device configuration: {}", msg)
            }
            AudioError::StreamCreationFailed(msg) => {
                write!(f, "Failed to create audio stream: {}", msg)
            }
            AudioError::StreamPlaybackFailed(msg) => {
                write!(f, "Failed to control audio playback: {}", msg)
            }
        }
    }
}

impl std::error::Error for AudioError {}

/// The cpal side of the built-in instrument.
pub struct ToneEngine {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
}

impl ToneEngine {
    /// Pick the default output device and its default configuration.
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let supported_config = device
            .default_output_config()
            .map_err(|e| AudioError::ConfigurationFailed(e.to_string()))?;

        let config = StreamConfig {
            channels: supported_config.channels(),
            sample_rate: SampleRate(supported_config.sample_rate().0),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    /// Open the default device, start the stream and return the instrument
    /// that plays into it.
    pub fn open(preset: &'static InstrumentPreset) -> Result<(Self, ToneInstrument), AudioError> {
        let (sender, receiver) = ToneChannels::with_defaults().split();
        let mut engine = Self::new()?;
        engine.start(receiver, preset)?;
        Ok((engine, ToneInstrument::new(sender, preset)))
    }

    pub fn device_name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "Unknown".to_string())
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Build and start the output stream. The receiver and a fresh voice bank
    /// move into the audio callback.
    pub fn start(
        &mut self,
        mut receiver: ToneReceiver,
        preset: &'static InstrumentPreset,
    ) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let mut voices = VoiceBank::new(self.config.sample_rate.0 as f32);
        voices.set_preset(preset);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    receiver.process_commands(|cmd| voices.handle(cmd));
                    voices.render(data, channels);
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::StreamCreationFailed(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlaybackFailed(e.to_string()))?;

        log::info!(
            "Audio started on {} ({} Hz, {} channels)",
            self.device_name(),
            self.sample_rate(),
            self.channels()
        );
        self.stream = Some(stream);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = self.stream.take() {
            stream
                .pause()
                .map_err(|e| AudioError::StreamPlaybackFailed(e.to_string()))?;
            log::info!("Audio stopped");
        }
        Ok(())
    }
}

/// Plays notes on the tone engine through its command queue.
pub struct ToneInstrument {
    sender: ToneSender,
    preset: &'static InstrumentPreset,
}

impl ToneInstrument {
    pub fn new(sender: ToneSender, preset: &'static InstrumentPreset) -> Self {
        Self { sender, preset }
    }

    pub fn preset(&self) -> &'static InstrumentPreset {
        self.preset
    }

    pub fn set_preset(&mut self, preset: &'static InstrumentPreset) {
        if self.preset.id != preset.id {
            log::info!("Instrument set to {}", preset.title);
            self.preset = preset;
            self.send(ToneCommand::SetPreset(preset));
        }
    }

    pub fn all_notes_off(&mut self) {
        self.send(ToneCommand::AllNotesOff);
    }

    fn send(&mut self, cmd: ToneCommand) {
        if let Err(cmd) = self.sender.send(cmd) {
            log::warn!("Tone command queue full, dropping {:?}", cmd);
        }
    }
}

impl Instrument for ToneInstrument {
    fn trigger_attack(&mut self, note: Note) {
        self.send(ToneCommand::NoteOn {
            key: note.midi_number(),
            frequency: note.frequency(),
        });
    }

    fn trigger_release(&mut self, note: Note) {
        self.send(ToneCommand::NoteOff {
            key: note.midi_number(),
        });
    }
}
