//! Virtual Piano Library
//!
//! Note model, chord theory, keyboard layout and multi-pointer tracking for a
//! playable on-screen piano, plus the tone engine and egui front end.

pub mod app;
pub mod instrument;
pub mod keyboard;
pub mod performance;
pub mod persistence;
pub mod theory;
pub mod widgets;
