//! Application module
//!
//! Contains the eframe application, theme definitions, and UI state management.

pub mod piano_app;
pub mod theme;

pub use piano_app::{PianoApp, ToolbarActions};
