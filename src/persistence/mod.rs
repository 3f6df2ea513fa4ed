//! Persistence module
//!
//! Settings save/load using serde and JSON.

pub mod settings;

pub use settings::{
    load_from_file, load_or_default, save_to_file, PianoSettings, SettingsError, DEFAULT_OFFSET,
    SETTINGS_VERSION,
};
