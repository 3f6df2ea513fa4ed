//! Keyboard controller: layout + hit-testing + pointer tracking behind the
//! entry points a UI shell calls from its event handlers.

use super::layout::{clamp_offset, KeyboardLayout, LayoutParams, Orientation};
use super::pointer::{PointerId, PointerTracker};
use crate::instrument::Instrument;
use crate::theory::Note;

/// One on-screen keyboard.
///
/// Geometry changes (resize, scroll, orientation) only affect later
/// hit-tests; notes already held keep sounding until their pointer lifts.
#[derive(Clone, Debug)]
pub struct PianoKeyboard {
    layout: KeyboardLayout,
    tracker: PointerTracker,
}

impl Default for PianoKeyboard {
    fn default() -> Self {
        Self::new(LayoutParams::default())
    }
}

impl PianoKeyboard {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            layout: KeyboardLayout::compute(params),
            tracker: PointerTracker::new(),
        }
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn params(&self) -> &LayoutParams {
        self.layout.params()
    }

    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }

    /// Replace the layout parameters. The layout is only recomputed when
    /// something changed.
    pub fn set_params(&mut self, params: LayoutParams) {
        if params != *self.layout.params() {
            self.layout = KeyboardLayout::compute(params);
        }
    }

    /// The canvas moved or changed size.
    pub fn on_resize(&mut self, origin_x: f32, origin_y: f32, width: f32, height: f32) {
        self.set_params(LayoutParams {
            origin_x,
            origin_y,
            width,
            height,
            ..*self.params()
        });
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.set_params(LayoutParams {
            offset: clamp_offset(offset),
            ..*self.params()
        });
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.set_params(LayoutParams {
            orientation,
            ..*self.params()
        });
    }

    pub fn set_visible_white_keys(&mut self, visible_white_keys: usize) {
        self.set_params(LayoutParams {
            visible_white_keys,
            ..*self.params()
        });
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.set_params(LayoutParams {
            scale,
            ..*self.params()
        });
    }

    /// Note under a viewport position.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<Note> {
        self.layout.hit_test(x, y)
    }

    pub fn on_pointer_down(
        &mut self,
        pointer: PointerId,
        x: f32,
        y: f32,
        instrument: &mut impl Instrument,
    ) {
        let note = self.layout.hit_test(x, y);
        self.tracker.pointer_down(pointer, note, instrument);
    }

    pub fn on_pointer_move(
        &mut self,
        pointer: PointerId,
        x: f32,
        y: f32,
        instrument: &mut impl Instrument,
    ) {
        let note = self.layout.hit_test(x, y);
        self.tracker.pointer_move(pointer, note, instrument);
    }

    pub fn on_pointer_up(&mut self, pointer: PointerId, instrument: &mut impl Instrument) {
        self.tracker.pointer_up(pointer, instrument);
    }

    pub fn on_pointer_cancel(&mut self, pointer: PointerId, instrument: &mut impl Instrument) {
        self.tracker.pointer_cancel(pointer, instrument);
    }

    /// Lift every pointer, e.g. when the window loses focus.
    pub fn release_all(&mut self, instrument: &mut impl Instrument) {
        self.tracker.release_all(instrument);
    }

    pub fn is_pressed(&self, note: Note) -> bool {
        self.tracker.is_pressed(note)
    }
}
