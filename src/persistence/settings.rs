//! Piano settings serialization.
//!
//! The settings document holds everything the user can configure from the
//! toolbar: scroll position, key size, instrument, theme and chord mode. It
//! is stored as pretty-printed JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::instrument::{default_preset, find_preset, InstrumentPreset};
use crate::keyboard::{KeySize, MAX_OFFSET};
use crate::performance::ChordMode;
use crate::theory::{ChordQuality, PitchClass};

/// Current settings format version.
/// Increment this when making breaking changes to the format.
pub const SETTINGS_VERSION: u32 = 1;

/// White-key offset of C3, where a fresh keyboard starts.
pub const DEFAULT_OFFSET: f32 = 21.0;

/// User-facing configuration of the piano.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PianoSettings {
    /// Settings format version for future compatibility.
    pub version: u32,
    /// Scroll position in white keys.
    pub offset: f32,
    pub key_size: KeySize,
    /// Id of the selected instrument preset.
    pub instrument: String,
    #[serde(default)]
    pub dark: bool,
    #[serde(default)]
    pub chord_mode: bool,
    /// Chord quality per root; roots not listed play major.
    #[serde(default)]
    pub chord_mode_config: BTreeMap<PitchClass, ChordQuality>,
}

impl Default for PianoSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            offset: DEFAULT_OFFSET,
            key_size: KeySize::default(),
            instrument: default_preset().id.to_string(),
            dark: false,
            chord_mode: false,
            chord_mode_config: BTreeMap::new(),
        }
    }
}

impl PianoSettings {
    /// Check if this settings version is compatible with the current format.
    pub fn is_compatible(&self) -> bool {
        self.version <= SETTINGS_VERSION
    }

    /// Reject values the UI could never have produced.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.offset.is_finite() || !(0.0..=MAX_OFFSET).contains(&self.offset) {
            return Err(SettingsError::InvalidSettings(format!(
                "offset {} outside 0..={}",
                self.offset, MAX_OFFSET
            )));
        }
        if find_preset(&self.instrument).is_none() {
            return Err(SettingsError::InvalidSettings(format!(
                "unknown instrument '{}'",
                self.instrument
            )));
        }
        Ok(())
    }

    /// The selected preset, falling back to the default one.
    pub fn preset(&self) -> &'static InstrumentPreset {
        find_preset(&self.instrument).unwrap_or_else(default_preset)
    }

    /// Chord expansion configured by these settings.
    pub fn chord_mode_rules(&self) -> ChordMode {
        ChordMode::new(self.chord_mode_config.clone())
    }
}

/// Error type for settings operations.
#[derive(Debug)]
pub enum SettingsError {
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON serialization/deserialization error.
    SerializationError(serde_json::Error),
    /// Settings written by a newer version.
    IncompatibleVersion { found: u32, expected: u32 },
    /// Well-formed JSON with values out of range.
    InvalidSettings(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "File error: {}", e),
            Self::SerializationError(e) => write!(f, "Serialization error: {}", e),
            Self::IncompatibleVersion { found, expected } => {
                write!(
                    f,
                    "Incompatible settings version: found {}, expected <= {}",
                    found, expected
                )
            }
            Self::InvalidSettings(reason) => write!(f, "Invalid settings: {}", reason),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(e) => Some(e),
            Self::SerializationError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err)
    }
}

/// Save settings to a JSON file.
pub fn save_to_file(settings: &PianoSettings, path: &Path) -> Result<(), SettingsError> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load settings from a JSON file.
pub fn load_from_file(path: &Path) -> Result<PianoSettings, SettingsError> {
    let json = std::fs::read_to_string(path)?;
    let settings: PianoSettings = serde_json::from_str(&json)?;

    if !settings.is_compatible() {
        return Err(SettingsError::IncompatibleVersion {
            found: settings.version,
            expected: SETTINGS_VERSION,
        });
    }
    settings.validate()?;

    Ok(settings)
}

/// Load settings, falling back to defaults when the file is missing or
/// unusable.
pub fn load_or_default(path: &Path) -> PianoSettings {
    match load_from_file(path) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", path.display());
            settings
        }
        Err(SettingsError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No settings at {}, using defaults", path.display());
            PianoSettings::default()
        }
        Err(e) => {
            log::warn!("Ignoring settings at {}: {}", path.display(), e);
            PianoSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "virtual_piano_{}_{}.json",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_defaults() {
        let settings = PianoSettings::default();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.offset, 21.0);
        assert_eq!(settings.key_size, KeySize::Large);
        assert_eq!(settings.instrument, "piano");
        assert!(!settings.dark);
        assert!(!settings.chord_mode);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_json_shape() {
        let mut settings = PianoSettings::default();
        settings.chord_mode_config.insert(PitchClass::FSharp, ChordQuality::Minor);
        let json = serde_json::to_value(&settings).unwrap();

        assert_eq!(json["keySize"], "large");
        assert_eq!(json["chordMode"], false);
        assert_eq!(json["chordModeConfig"]["F#"], "minor");
    }

    #[test]
    fn test_file_round_trip() {
        let path = temp_path("round_trip");
        let mut settings = PianoSettings::default();
        settings.offset = 35.5;
        settings.key_size = KeySize::Huge;
        settings.instrument = "harp".to_string();
        settings.dark = true;
        settings.chord_mode = true;
        settings.chord_mode_config.insert(PitchClass::A, ChordQuality::Minor);

        save_to_file(&settings, &path).unwrap();
        let loaded = load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, settings);
        assert_eq!(loaded.preset().title, "Harp");
        assert_eq!(loaded.chord_mode_rules().quality(PitchClass::A), ChordQuality::Minor);
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{"version":1,"offset":14,"keySize":"normal","instrument":"organ"}"#;
        let settings: PianoSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.offset, 14.0);
        assert_eq!(settings.key_size, KeySize::Normal);
        assert!(!settings.chord_mode);
        assert!(settings.chord_mode_config.is_empty());
    }

    #[test]
    fn test_version_compatibility() {
        let path = temp_path("future");
        let settings = PianoSettings {
            version: SETTINGS_VERSION + 1,
            ..PianoSettings::default()
        };
        assert!(!settings.is_compatible());

        save_to_file(&settings, &path).unwrap();
        let result = load_from_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(SettingsError::IncompatibleVersion { found: 2, expected: 1 })
        ));
    }

    #[test]
    fn test_validation() {
        let bad_offset = PianoSettings {
            offset: 200.0,
            ..PianoSettings::default()
        };
        assert!(matches!(
            bad_offset.validate(),
            Err(SettingsError::InvalidSettings(_))
        ));

        let bad_instrument = PianoSettings {
            instrument: "kazoo".to_string(),
            ..PianoSettings::default()
        };
        let err = bad_instrument.validate().unwrap_err();
        assert!(err.to_string().contains("kazoo"));
        assert_eq!(bad_instrument.preset().id, "piano");
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let missing = temp_path("missing");
        assert_eq!(load_or_default(&missing), PianoSettings::default());

        let garbage = temp_path("garbage");
        std::fs::write(&garbage, "{ not json").unwrap();
        let settings = load_or_default(&garbage);
        std::fs::remove_file(&garbage).ok();
        assert_eq!(settings, PianoSettings::default());

        let invalid = temp_path("invalid");
        std::fs::write(
            &invalid,
            r#"{"version":1,"offset":-3,"keySize":"large","instrument":"piano"}"#,
        )
        .unwrap();
        let settings = load_or_default(&invalid);
        std::fs::remove_file(&invalid).ok();
        assert_eq!(settings, PianoSettings::default());
    }

    #[test]
    fn test_error_display() {
        let err = SettingsError::IncompatibleVersion {
            found: 3,
            expected: 1,
        };
        assert!(err.to_string().contains("found 3"));

        let io = SettingsError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(std::error::Error::source(&io).is_some());
    }
}
