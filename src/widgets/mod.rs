//! Widgets module
//!
//! Custom UI controls for the piano interface.

pub mod piano;

pub use piano::{
    key_screen_rect, layout_params_for, piano, touch_pointer_id, PianoColors, PianoConfig,
    PianoData,
};
