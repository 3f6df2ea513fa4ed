//! Keyboard layout engine.
//!
//! Computes the rectangle of every key over a scrollable window of white
//! keys. Geometry is expressed along a "long" axis (the length of the
//! keyboard) and a "short" axis (key depth) so the same code lays out
//! horizontal and vertical keyboards.

use serde::{Deserialize, Serialize};

use crate::theory::{offset_to_note, Note};

/// Black key width relative to a white key.
pub const BLACK_KEY_SIZE: f32 = 0.7;

/// Smallest number of white keys a keyboard shows.
pub const MIN_VISIBLE_WHITE_KEYS: usize = 5;

/// Largest start offset (in white keys) the layout accepts.
pub const MAX_OFFSET: f32 = 108.0;

/// White keys laid out before the visible window, so black keys straddling
/// the left edge are drawn.
const MAX_EXTRA_WHITE_KEYS_LEFT: usize = 2;

/// White keys laid out after the visible window.
const EXTRA_WHITE_KEYS_RIGHT: usize = 2;

/// Direction the keyboard runs in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Low notes on the left.
    #[default]
    Horizontal,
    /// Low notes at the bottom.
    Vertical,
}

impl Orientation {
    pub fn is_vertical(self) -> bool {
        self == Orientation::Vertical
    }
}

/// Preferred white-key size category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySize {
    Normal,
    #[default]
    Large,
    Huge,
}

impl KeySize {
    pub const ALL: [KeySize; 3] = [KeySize::Normal, KeySize::Large, KeySize::Huge];

    /// Ideal white-key size along the long axis, in points.
    pub fn ideal_px(self) -> f32 {
        match self {
            KeySize::Normal => 44.0,
            KeySize::Large => 64.0,
            KeySize::Huge => 80.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KeySize::Normal => "Normal",
            KeySize::Large => "Large",
            KeySize::Huge => "Huge",
        }
    }
}

/// Number of white keys that fit a keyboard of the given length.
pub fn visible_white_keys_for(long_size: f32, key_size: KeySize) -> usize {
    let ideal = (long_size / key_size.ideal_px()).round().max(0.0) as usize;
    ideal.max(MIN_VISIBLE_WHITE_KEYS)
}

/// Clamp a start offset to the playable range.
pub fn clamp_offset(offset: f32) -> f32 {
    offset.clamp(0.0, MAX_OFFSET)
}

/// Pixel snapping used for black keys. Halves round towards +infinity so
/// adjacent keys snap the same way on both sides of zero.
fn snap(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// Inputs of a layout pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    /// Canvas top-left corner in viewport coordinates.
    pub origin_x: f32,
    pub origin_y: f32,
    /// Canvas size in layout units.
    pub width: f32,
    pub height: f32,
    pub orientation: Orientation,
    /// First visible white key, in white-key units. Fractional values scroll
    /// smoothly between keys.
    pub offset: f32,
    /// White keys spanning the long axis.
    pub visible_white_keys: usize,
    /// Layout units per viewport unit (device pixels per point).
    pub scale: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            width: 700.0,
            height: 200.0,
            orientation: Orientation::Horizontal,
            offset: 3.0 * 7.0,
            visible_white_keys: 10,
            scale: 1.0,
        }
    }
}

impl LayoutParams {
    /// Canvas extent along the keyboard.
    pub fn long_size(&self) -> f32 {
        if self.orientation.is_vertical() {
            self.height
        } else {
            self.width
        }
    }

    /// Canvas extent across the keyboard.
    pub fn short_size(&self) -> f32 {
        if self.orientation.is_vertical() {
            self.width
        } else {
            self.height
        }
    }

    /// Convert a viewport position to canvas-local layout units.
    pub fn to_local(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.origin_x) * self.scale,
            (y - self.origin_y) * self.scale,
        )
    }
}

/// Position and size of one key on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyRect {
    pub note: Note,
    pub black: bool,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl KeyRect {
    /// Build a rect from long/short axis coordinates.
    fn along(
        orientation: Orientation,
        note: Note,
        black: bool,
        long_pos: f32,
        long_size: f32,
        short_pos: f32,
        short_size: f32,
    ) -> Self {
        if orientation.is_vertical() {
            Self {
                note,
                black,
                x: short_pos,
                y: long_pos,
                w: short_size,
                h: long_size,
            }
        } else {
            Self {
                note,
                black,
                x: long_pos,
                y: short_pos,
                w: long_size,
                h: short_size,
            }
        }
    }

    /// Half-open containment: left/top edges are inside, right/bottom are not.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Whether any part of the key lies inside a `width` x `height` canvas.
    pub fn intersects_canvas(&self, width: f32, height: f32) -> bool {
        self.x < width && self.x + self.w > 0.0 && self.y < height && self.y + self.h > 0.0
    }
}

/// Notes from the white key at `offset` upwards, ending on the
/// `white_keys`-th white key.
pub fn note_range_for_layout(offset: f32, white_keys: usize) -> Vec<Note> {
    let mut notes = Vec::new();
    if white_keys == 0 {
        return notes;
    }

    let mut current = offset_to_note(offset);
    let mut whites = 0;
    loop {
        notes.push(current);
        if !current.is_black() {
            whites += 1;
        }
        if whites >= white_keys {
            break;
        }
        current = current.next();
    }
    notes
}

/// Lay out every key touching the visible window.
///
/// The result lists all black keys before all white keys: black keys sit on
/// top, so they are hit-tested first and drawn last.
pub fn compute_key_layout(params: &LayoutParams) -> Vec<KeyRect> {
    let offset = clamp_offset(params.offset);
    let vertical = params.orientation.is_vertical();
    let long_size = params.long_size();
    let short_size = params.short_size();
    let visible = params.visible_white_keys.max(1);

    let extra_left = (offset.round() as usize).min(MAX_EXTRA_WHITE_KEYS_LEFT);
    let notes = note_range_for_layout(
        offset - extra_left as f32,
        visible + extra_left + EXTRA_WHITE_KEYS_RIGHT,
    );

    // +1 hides the rounding gap at the far edge
    let white_key_size = (long_size + 1.0) / visible as f32;
    let scroll = (offset.fract() + extra_left as f32) * white_key_size;
    let map_long = |pos: f32, size: f32| {
        if vertical {
            long_size - pos - size + scroll
        } else {
            pos - scroll
        }
    };

    let mut black_keys = Vec::new();
    let mut white_keys = Vec::new();
    let mut white_index = 0;

    for note in notes {
        let long_pos = white_index as f32 * white_key_size;
        if note.is_black() {
            let size = snap(white_key_size * BLACK_KEY_SIZE);
            black_keys.push(KeyRect::along(
                params.orientation,
                note,
                true,
                snap(map_long(long_pos - size / 2.0, size)),
                size,
                0.0,
                snap(short_size / 2.0),
            ));
        } else {
            white_keys.push(KeyRect::along(
                params.orientation,
                note,
                false,
                map_long(long_pos - 0.5, white_key_size),
                white_key_size,
                -1.0,
                short_size + 1.0,
            ));
            white_index += 1;
        }
    }

    black_keys.extend(white_keys);
    black_keys
}

/// A computed layout together with the parameters it was computed from.
#[derive(Clone, Debug)]
pub struct KeyboardLayout {
    params: LayoutParams,
    keys: Vec<KeyRect>,
}

impl KeyboardLayout {
    pub fn compute(params: LayoutParams) -> Self {
        let keys = compute_key_layout(&params);
        log::trace!(
            "layout: {} keys, offset {:.2}, {} white keys visible",
            keys.len(),
            params.offset,
            params.visible_white_keys
        );
        Self { params, keys }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// Keys in hit-test order (black first).
    pub fn keys(&self) -> &[KeyRect] {
        &self.keys
    }

    /// Keys in draw order (white first, black on top).
    pub fn draw_order(&self) -> impl Iterator<Item = &KeyRect> {
        self.keys.iter().rev()
    }

    pub fn key_for(&self, note: Note) -> Option<&KeyRect> {
        self.keys.iter().find(|k| k.note == note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Note {
        s.parse().unwrap()
    }

    fn params() -> LayoutParams {
        LayoutParams {
            width: 700.0,
            height: 200.0,
            offset: 21.0,
            visible_white_keys: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_note_range_ends_on_white_key() {
        let range = note_range_for_layout(21.0, 3);
        let expected: Vec<Note> = ["C3", "C#3", "D3", "D#3", "E3"].iter().map(|s| n(s)).collect();
        assert_eq!(range, expected);
        assert!(note_range_for_layout(0.0, 0).is_empty());
        assert_eq!(note_range_for_layout(2.0, 1), vec![n("E0")]);
    }

    #[test]
    fn test_black_keys_precede_white_keys() {
        for offset in [0.0, 0.4, 1.0, 21.0, 33.7, 108.0] {
            let layout = compute_key_layout(&LayoutParams { offset, ..params() });
            let first_white = layout.iter().position(|k| !k.black).unwrap();
            assert!(layout[..first_white].iter().all(|k| k.black));
            assert!(layout[first_white..].iter().all(|k| !k.black));
            assert!(layout.iter().all(|k| k.black == k.note.is_black()));
        }
    }

    #[test]
    fn test_reference_layout() {
        let layout = compute_key_layout(&params());
        let whites: Vec<&KeyRect> = layout.iter().filter(|k| !k.black).collect();
        let blacks: Vec<&KeyRect> = layout.iter().filter(|k| k.black).collect();

        // two keys of lookbehind, ten visible, two of lookahead
        assert_eq!(whites.len(), 14);
        assert_eq!(whites.first().unwrap().note, n("A2"));
        assert_eq!(whites.last().unwrap().note, n("G4"));
        for key in &whites {
            assert!((key.w - 70.1).abs() < 1e-3);
            assert_eq!(key.y, -1.0);
            assert_eq!(key.h, 201.0);
        }

        let c3 = whites.iter().find(|k| k.note == n("C3")).unwrap();
        assert!((c3.x + 0.5).abs() < 1e-3);

        let visible: Vec<Note> = whites
            .iter()
            .filter(|k| k.intersects_canvas(700.0, 200.0))
            .map(|k| k.note)
            .collect();
        assert_eq!(visible.first(), Some(&n("C3")));
        assert_eq!(visible.last(), Some(&n("E4")));
        assert_eq!(visible.len(), 10);

        let black_notes: Vec<String> = blacks.iter().map(|k| k.note.to_string()).collect();
        assert_eq!(
            black_notes,
            ["A#2", "C#3", "D#3", "F#3", "G#3", "A#3", "C#4", "D#4", "F#4"]
        );
        for key in &blacks {
            assert_eq!(key.w, 49.0);
            assert_eq!(key.y, 0.0);
            assert_eq!(key.h, 100.0);
        }
    }

    #[test]
    fn test_black_keys_straddle_white_boundaries() {
        let layout = compute_key_layout(&params());
        for black in layout.iter().filter(|k| k.black) {
            let below = layout.iter().find(|k| k.note == black.note.transpose(-1)).unwrap();
            let above = layout.iter().find(|k| k.note == black.note.transpose(1)).unwrap();
            let boundary = above.x;
            assert!((below.x + below.w - boundary).abs() < 1e-3);
            let (center, _) = black.center();
            assert!((center - boundary).abs() <= 1.0, "{} off boundary", black.note);
        }
    }

    #[test]
    fn test_no_black_key_between_e_f_and_b_c() {
        let layout = compute_key_layout(&params());
        let bare_edges: Vec<f32> = layout
            .iter()
            .filter(|k| matches!(k.note.pitch.name(), "E" | "B"))
            .map(|k| k.x + k.w)
            .collect();
        assert!(!bare_edges.is_empty());
        for edge in bare_edges {
            assert!(layout
                .iter()
                .filter(|k| k.black)
                .all(|k| !(k.x <= edge && edge < k.x + k.w)));
        }
        let blacks = layout.iter().filter(|k| k.black).count();
        // A2..G4 spans 14 whites with 9 sharps between them
        assert_eq!(blacks, 9);
    }

    #[test]
    fn test_fractional_offset_scrolls_smoothly() {
        let whole = compute_key_layout(&params());
        let half = compute_key_layout(&LayoutParams {
            offset: 21.5,
            ..params()
        });
        for (a, b) in whole.iter().zip(half.iter()).filter(|(a, _)| !a.black) {
            assert_eq!(a.note, b.note);
            assert!((a.x - b.x - 35.05).abs() < 1e-3);
        }
    }

    #[test]
    fn test_offset_is_clamped() {
        let low = compute_key_layout(&LayoutParams { offset: -5.0, ..params() });
        let zero = compute_key_layout(&LayoutParams { offset: 0.0, ..params() });
        assert_eq!(low, zero);

        let high = compute_key_layout(&LayoutParams { offset: 500.0, ..params() });
        let max = compute_key_layout(&LayoutParams { offset: MAX_OFFSET, ..params() });
        assert_eq!(high, max);
    }

    #[test]
    fn test_start_of_instrument_has_no_lookbehind() {
        let layout = compute_key_layout(&LayoutParams { offset: 0.0, ..params() });
        let first_white = layout.iter().find(|k| !k.black).unwrap();
        assert_eq!(first_white.note, n("C0"));
        assert!((first_white.x + 0.5).abs() < 1e-3);
        assert_eq!(layout.iter().filter(|k| !k.black).count(), 12);
    }

    #[test]
    fn test_vertical_layout_is_mirrored() {
        let vertical = compute_key_layout(&LayoutParams {
            width: 200.0,
            height: 700.0,
            orientation: Orientation::Vertical,
            ..params()
        });

        let c3 = vertical.iter().find(|k| k.note == n("C3")).unwrap();
        assert_eq!(c3.x, -1.0);
        assert_eq!(c3.w, 201.0);
        assert!((c3.y + c3.h - 700.5).abs() < 1e-3);

        let e4 = vertical.iter().find(|k| k.note == n("E4")).unwrap();
        assert!((e4.y + 0.5).abs() < 1e-3);

        let cs3 = vertical.iter().find(|k| k.note == n("C#3")).unwrap();
        assert_eq!(cs3.h, 49.0);
        assert_eq!(cs3.w, 100.0);
        assert!(cs3.y < c3.y);
    }

    #[test]
    fn test_visible_white_keys_for() {
        assert_eq!(visible_white_keys_for(700.0, KeySize::Normal), 16);
        assert_eq!(visible_white_keys_for(700.0, KeySize::Large), 11);
        assert_eq!(visible_white_keys_for(700.0, KeySize::Huge), 9);
        assert_eq!(visible_white_keys_for(100.0, KeySize::Huge), MIN_VISIBLE_WHITE_KEYS);
        assert_eq!(visible_white_keys_for(0.0, KeySize::Normal), MIN_VISIBLE_WHITE_KEYS);
    }

    #[test]
    fn test_keyboard_layout_draw_order() {
        let layout = KeyboardLayout::compute(params());
        let order: Vec<bool> = layout.draw_order().map(|k| k.black).collect();
        let first_black = order.iter().position(|&b| b).unwrap();
        assert!(order[first_black..].iter().all(|&b| b));
        assert_eq!(layout.key_for(n("C3")).map(|k| k.black), Some(false));
        assert!(layout.key_for(n("C8")).is_none());
    }
}
