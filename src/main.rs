//! Virtual Piano - a playable on-screen piano keyboard
//!
//! Entry point for the application.

use std::path::PathBuf;

use eframe::egui;
use virtual_piano::app::PianoApp;

/// Environment variable overriding the settings file location.
const SETTINGS_ENV: &str = "VIRTUAL_PIANO_SETTINGS";

const DEFAULT_SETTINGS_FILE: &str = "piano_settings.json";

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings_path = std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    log::info!("Using settings file {}", settings_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Virtual Piano"),
        ..Default::default()
    };

    eframe::run_native(
        "Virtual Piano",
        options,
        Box::new(|_cc| Ok(Box::new(PianoApp::new(settings_path)))),
    )
}
