//! Keyboard module
//!
//! Key geometry, hit-testing and multi-pointer note tracking.

pub mod controller;
pub mod layout;
pub mod pointer;

pub use controller::PianoKeyboard;
pub use hit_test::{hit_test, hit_test_keys};
pub use layout::{
    clamp_offset, compute_key_layout, note_range_for_layout, visible_white_keys_for, KeyRect,
    KeySize, KeyboardLayout, LayoutParams, Orientation, BLACK_KEY_SIZE, MAX_OFFSET,
    MIN_VISIBLE_WHITE_KEYS,
};
pub use pointer::{PointerId, PointerTracker, MOUSE_POINTER_ID};
