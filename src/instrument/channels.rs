//! Tone Channels
//!
//! Lock-free command queue from the UI thread to the audio callback.
//! Uses an rtrb ring buffer (single producer, single consumer).

use rtrb::{Consumer, Producer, RingBuffer};

use super::presets::InstrumentPreset;

/// Default capacity of the command queue.
pub const DEFAULT_COMMAND_BUFFER_SIZE: usize = 1024;

/// Messages the UI sends to the tone engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneCommand {
    /// Start (or restart) the voice for `key`.
    NoteOn {
        /// MIDI-style key number identifying the voice.
        key: i32,
        /// Oscillator frequency in Hz.
        frequency: f32,
    },
    /// Move the voice for `key` into its release.
    NoteOff { key: i32 },
    /// Release every sounding voice.
    AllNotesOff,
    /// Switch the waveform and envelope used for new notes.
    SetPreset(&'static InstrumentPreset),
}

/// Both ends of the command queue, before they are handed to their threads.
pub struct ToneChannels {
    pub command_tx: Producer<ToneCommand>,
    pub command_rx: Consumer<ToneCommand>,
}

impl ToneChannels {
    pub fn new(capacity: usize) -> Self {
        let (command_tx, command_rx) = RingBuffer::new(capacity);
        Self {
            command_tx,
            command_rx,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_COMMAND_BUFFER_SIZE)
    }

    /// Split into the UI-side sender and the audio-side receiver.
    pub fn split(self) -> (ToneSender, ToneReceiver) {
        (
            ToneSender {
                command_tx: self.command_tx,
            },
            ToneReceiver {
                command_rx: self.command_rx,
            },
        )
    }
}

/// UI side of the queue.
pub struct ToneSender {
    command_tx: Producer<ToneCommand>,
}

impl ToneSender {
    /// Queue a command without waiting. Gives the command back when the
    /// queue is full.
    pub fn send(&mut self, cmd: ToneCommand) -> Result<(), ToneCommand> {
        self.command_tx
            .push(cmd)
            .map_err(|rtrb::PushError::Full(cmd)| cmd)
    }

    pub fn slots_available(&self) -> usize {
        self.command_tx.slots()
    }

    pub fn is_full(&self) -> bool {
        self.command_tx.is_full()
    }
}

/// Audio side of the queue. Never blocks or allocates.
pub struct ToneReceiver {
    command_rx: Consumer<ToneCommand>,
}

impl ToneReceiver {
    pub fn recv(&mut self) -> Option<ToneCommand> {
        self.command_rx.pop().ok()
    }

    /// Hand every pending command to `handler`, oldest first.
    pub fn process_commands<F>(&mut self, mut handler: F)
    where
        F: FnMut(ToneCommand),
    {
        while let Some(cmd) = self.recv() {
            handler(cmd);
        }
    }

    pub fn pending(&self) -> usize {
        self.command_rx.slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::presets::PRESETS;

    #[test]
    fn test_channel_capacity() {
        let channels = ToneChannels::new(64);
        assert_eq!(channels.command_tx.slots(), 64);

        let channels = ToneChannels::with_defaults();
        assert_eq!(channels.command_tx.slots(), DEFAULT_COMMAND_BUFFER_SIZE);
    }

    #[test]
    fn test_send_receive_in_order() {
        let (mut tx, mut rx) = ToneChannels::new(8).split();
        tx.send(ToneCommand::NoteOn {
            key: 60,
            frequency: 261.63,
        })
        .unwrap();
        tx.send(ToneCommand::NoteOff { key: 60 }).unwrap();
        tx.send(ToneCommand::SetPreset(&PRESETS[1])).unwrap();
        assert_eq!(rx.pending(), 3);

        let mut received = Vec::new();
        rx.process_commands(|cmd| received.push(cmd));
        assert_eq!(received.len(), 3);
        assert!(matches!(received[0], ToneCommand::NoteOn { key: 60, .. }));
        assert_eq!(received[1], ToneCommand::NoteOff { key: 60 });
        assert_eq!(received[2], ToneCommand::SetPreset(&PRESETS[1]));
        assert!(rx.recv().is_none());
    }

    #[test]
    fn test_full_queue_returns_command() {
        let (mut tx, _rx) = ToneChannels::new(2).split();
        assert!(tx.send(ToneCommand::AllNotesOff).is_ok());
        assert!(tx.send(ToneCommand::AllNotesOff).is_ok());
        assert!(tx.is_full());
        assert_eq!(tx.slots_available(), 0);

        let result = tx.send(ToneCommand::NoteOff { key: 1 });
        assert_eq!(result, Err(ToneCommand::NoteOff { key: 1 }));
    }

    #[test]
    fn test_handles_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ToneSender>();
        assert_send::<ToneReceiver>();
    }
}
