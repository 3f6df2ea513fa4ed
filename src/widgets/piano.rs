//! Playable piano keyboard widget.
//!
//! Paints a [`PianoKeyboard`] layout and feeds mouse and touch input into
//! its pointer tracker. Keys light up for every sounding note, and chord
//! labels are drawn on the keys that carry one.

use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::{
    self, Color32, Event, PointerButton, Pos2, Rect, Response, Sense, Stroke, TouchId,
    TouchPhase, Ui, Vec2,
};

use crate::instrument::Instrument;
use crate::keyboard::{
    visible_white_keys_for, KeyRect, KeySize, LayoutParams, Orientation, PianoKeyboard, PointerId,
    MOUSE_POINTER_ID,
};
use crate::theory::{Note, PitchClass};

/// Colors used to paint the keyboard.
#[derive(Clone, Debug, PartialEq)]
pub struct PianoColors {
    /// Color of white keys when inactive.
    pub white_key: Color32,
    /// Color of black keys when inactive.
    pub black_key: Color32,
    /// Color of white keys when sounding.
    pub white_key_active: Color32,
    /// Color of black keys when sounding.
    pub black_key_active: Color32,
    /// Glow drawn around sounding keys.
    pub glow: Color32,
    pub border: Color32,
    /// Octave labels on C keys.
    pub label: Color32,
    /// Chord labels.
    pub annotation: Color32,
}

impl Default for PianoColors {
    fn default() -> Self {
        Self::light()
    }
}

impl PianoColors {
    pub fn light() -> Self {
        Self {
            white_key: Color32::from_rgb(240, 240, 235),
            black_key: Color32::from_rgb(30, 30, 35),
            white_key_active: Color32::from_rgb(100, 180, 255),
            black_key_active: Color32::from_rgb(80, 140, 200),
            glow: Color32::from_rgb(100, 180, 255),
            border: Color32::from_gray(120),
            label: Color32::from_gray(130),
            annotation: Color32::from_rgb(40, 90, 160),
        }
    }

    pub fn dark() -> Self {
        Self {
            white_key: Color32::from_rgb(70, 70, 90),
            black_key: Color32::from_rgb(18, 18, 28),
            white_key_active: Color32::from_rgb(180, 100, 200),
            black_key_active: Color32::from_rgb(140, 80, 160),
            glow: Color32::from_rgb(180, 100, 200),
            border: Color32::from_rgb(26, 26, 46),
            label: Color32::from_gray(160),
            annotation: Color32::from_rgb(255, 183, 77),
        }
    }

    pub fn for_theme(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Fill for a key given its color and whether it is sounding.
    pub fn key_fill(&self, black: bool, active: bool) -> Color32 {
        match (black, active) {
            (false, false) => self.white_key,
            (false, true) => self.white_key_active,
            (true, false) => self.black_key,
            (true, true) => self.black_key_active,
        }
    }
}

/// Configuration for one keyboard widget.
#[derive(Clone, Debug)]
pub struct PianoConfig {
    pub key_size: KeySize,
    pub orientation: Orientation,
    pub colors: PianoColors,
    /// Whether to label every C with its octave.
    pub show_octave_labels: bool,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            key_size: KeySize::default(),
            orientation: Orientation::default(),
            colors: PianoColors::default(),
            show_octave_labels: true,
        }
    }
}

impl PianoConfig {
    pub fn with_key_size(mut self, key_size: KeySize) -> Self {
        self.key_size = key_size;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_colors(mut self, colors: PianoColors) -> Self {
        self.colors = colors;
        self
    }
}

/// What the keyboard should show this frame.
#[derive(Clone, Copy, Debug)]
pub struct PianoData<'a> {
    /// Notes to highlight.
    pub active_notes: &'a BTreeSet<Note>,
    /// Labels to draw on keys.
    pub annotations: &'a BTreeMap<Note, String>,
}

/// Pointer id for a touch. Shifted by one so no finger collides with the
/// mouse.
pub fn touch_pointer_id(id: TouchId) -> PointerId {
    id.0.wrapping_add(1).max(MOUSE_POINTER_ID + 1)
}

/// Layout parameters for a keyboard filling `rect`.
pub fn layout_params_for(rect: Rect, offset: f32, config: &PianoConfig) -> LayoutParams {
    let long = if config.orientation.is_vertical() {
        rect.height()
    } else {
        rect.width()
    };
    LayoutParams {
        origin_x: rect.min.x,
        origin_y: rect.min.y,
        width: rect.width(),
        height: rect.height(),
        orientation: config.orientation,
        offset,
        visible_white_keys: visible_white_keys_for(long, config.key_size),
        scale: 1.0,
    }
}

/// Screen rectangle of a laid-out key.
pub fn key_screen_rect(key: &KeyRect, params: &LayoutParams) -> Rect {
    let min = Pos2::new(
        params.origin_x + key.x / params.scale,
        params.origin_y + key.y / params.scale,
    );
    Rect::from_min_size(min, Vec2::new(key.w, key.h) / params.scale)
}

/// Draw `keyboard` into the available space and route this frame's pointer
/// events to it.
pub fn piano(
    ui: &mut Ui,
    keyboard: &mut PianoKeyboard,
    data: &PianoData<'_>,
    config: &PianoConfig,
    instrument: &mut impl Instrument,
) -> Response {
    let rect = ui.available_rect_before_wrap();
    let response = ui.allocate_rect(rect, Sense::click_and_drag());

    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return response;
    }

    let offset = keyboard.params().offset;
    keyboard.set_params(layout_params_for(rect, offset, config));

    handle_input(ui, &response, keyboard, instrument);

    if ui.is_rect_visible(rect) {
        paint(ui, rect, keyboard, data, config);
    }

    response
}

/// Whether a press at `pos` lands on this keyboard rather than on a popup,
/// window or other layer drawn above it.
fn owns_position(ui: &Ui, rect: Rect, pos: Pos2) -> bool {
    rect.contains(pos)
        && ui
            .ctx()
            .layer_id_at(pos)
            .map_or(true, |layer| layer == ui.layer_id())
}

fn handle_input(
    ui: &Ui,
    response: &Response,
    keyboard: &mut PianoKeyboard,
    instrument: &mut impl Instrument,
) {
    let rect = response.rect;
    let (events, focused) = ui.input(|i| (i.events.clone(), i.focused));

    if !focused {
        keyboard.release_all(instrument);
        return;
    }

    // egui also emulates the mouse from the first finger
    let has_touch = events.iter().any(|e| matches!(e, Event::Touch { .. }));

    for event in events {
        match event {
            Event::Touch { id, phase, pos, .. } => {
                let pointer = touch_pointer_id(id);
                match phase {
                    TouchPhase::Start => {
                        if owns_position(ui, rect, pos) {
                            keyboard.on_pointer_down(pointer, pos.x, pos.y, instrument);
                        }
                    }
                    TouchPhase::Move => keyboard.on_pointer_move(pointer, pos.x, pos.y, instrument),
                    TouchPhase::End => keyboard.on_pointer_up(pointer, instrument),
                    TouchPhase::Cancel => keyboard.on_pointer_cancel(pointer, instrument),
                }
            }
            Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed,
                ..
            } if !has_touch => {
                if !pressed {
                    keyboard.on_pointer_up(MOUSE_POINTER_ID, instrument);
                } else if response.contains_pointer() && owns_position(ui, rect, pos) {
                    keyboard.on_pointer_down(MOUSE_POINTER_ID, pos.x, pos.y, instrument);
                }
            }
            Event::PointerMoved(pos) if !has_touch => {
                keyboard.on_pointer_move(MOUSE_POINTER_ID, pos.x, pos.y, instrument);
            }
            Event::PointerGone if !has_touch => {
                keyboard.on_pointer_cancel(MOUSE_POINTER_ID, instrument);
            }
            _ => {}
        }
    }
}

fn paint(ui: &Ui, rect: Rect, keyboard: &PianoKeyboard, data: &PianoData<'_>, config: &PianoConfig) {
    let painter = ui.painter_at(rect);
    let params = keyboard.params();
    let colors = &config.colors;
    let vertical = params.orientation.is_vertical();

    painter.rect_filled(rect, 0.0, colors.border);

    for key in keyboard.layout().draw_order() {
        let key_rect = key_screen_rect(key, params);
        let active = data.active_notes.contains(&key.note) || keyboard.is_pressed(key.note);
        let rounding = if key.black { 1.5 } else { 2.0 };

        if active {
            for layer in 0..3u8 {
                let alpha = 40 - layer * 12;
                let glow = Color32::from_rgba_unmultiplied(
                    colors.glow.r(),
                    colors.glow.g(),
                    colors.glow.b(),
                    alpha,
                );
                painter.rect_filled(key_rect.expand((3 - layer) as f32 * 1.5), rounding, glow);
            }
        }

        painter.rect_filled(key_rect, rounding, colors.key_fill(key.black, active));
        painter.rect_stroke(key_rect, rounding, Stroke::new(0.5, colors.border));

        let font_size = (params.short_size() * 0.08).clamp(9.0, 14.0);

        if let Some(label) = data.annotations.get(&key.note) {
            let text = format!("{}{}", key.note.pitch, label);
            painter.text(
                label_anchor(key_rect, vertical, 0.55),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(font_size),
                colors.annotation,
            );
        }

        if config.show_octave_labels && key.note.pitch == PitchClass::C {
            painter.text(
                label_anchor(key_rect, vertical, 0.88),
                egui::Align2::CENTER_CENTER,
                key.note.to_string(),
                egui::FontId::proportional(font_size * 0.85),
                colors.label,
            );
        }
    }
}

/// Point a fraction of the way along a key's short axis, from the edge
/// where black keys start.
fn label_anchor(key_rect: Rect, vertical: bool, fraction: f32) -> Pos2 {
    if vertical {
        Pos2::new(key_rect.left() + key_rect.width() * fraction, key_rect.center().y)
    } else {
        Pos2::new(key_rect.center().x, key_rect.top() + key_rect.height() * fraction)
    }
}
