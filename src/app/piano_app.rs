//! Main application struct for the Virtual Piano
//!
//! Contains the PianoApp which implements eframe::App and owns the
//! settings, the tone engine, the performer and the on-screen keyboards.

use std::path::PathBuf;

use eframe::egui::{self, Align, Layout, RichText};

use super::theme;
use crate::instrument::{categories, presets_in, InstrumentPreset, ToneEngine, ToneInstrument};
use crate::keyboard::{clamp_offset, KeySize, Orientation, PianoKeyboard};
use crate::performance::NotePerformer;
use crate::persistence::{load_or_default, save_to_file, PianoSettings};
use crate::theory::offset_to_note;
use crate::widgets::{piano, PianoColors, PianoConfig, PianoData};

/// White keys reachable with the scroll strip (octaves 0 to 8).
pub const SCROLLABLE_WHITE_KEYS: f32 = 63.0;

/// Minimum short-axis window size for a second keyboard.
pub const DUAL_PIANO_MIN_SIZE: f32 = 650.0;

/// Highest offset that still shows `visible` white keys inside the strip.
pub fn max_scroll_offset(visible: usize) -> f32 {
    (SCROLLABLE_WHITE_KEYS - visible as f32).max(0.0)
}

/// Orientation and dual-piano choice for a window size.
pub fn window_layout(width: f32, height: f32) -> (Orientation, bool) {
    if width < height {
        (Orientation::Vertical, width > DUAL_PIANO_MIN_SIZE)
    } else {
        (Orientation::Horizontal, height > DUAL_PIANO_MIN_SIZE)
    }
}

/// Main application state for the Virtual Piano
pub struct PianoApp {
    settings: PianoSettings,
    /// Where settings are saved; `None` keeps them in memory only.
    settings_path: Option<PathBuf>,
    /// Audio stream; kept alive for the lifetime of the app.
    engine: Option<ToneEngine>,
    audio_error_message: Option<String>,
    performer: NotePerformer<Option<ToneInstrument>>,
    /// Lower keyboard first.
    keyboards: [PianoKeyboard; 2],
    orientation: Orientation,
    dual_piano: bool,
    /// Theme currently applied to the context.
    applied_dark: Option<bool>,
}

impl PianoApp {
    /// Load settings from `settings_path` and open the default audio device.
    pub fn new(settings_path: PathBuf) -> Self {
        let settings = load_or_default(&settings_path);

        let (engine, instrument, audio_error_message) = match ToneEngine::open(settings.preset()) {
            Ok((engine, instrument)) => (Some(engine), Some(instrument), None),
            Err(e) => {
                log::warn!("Audio unavailable: {}", e);
                (None, None, Some(e.to_string()))
            }
        };

        let mut app = Self::with_instrument(settings, instrument);
        app.settings_path = Some(settings_path);
        app.engine = engine;
        app.audio_error_message = audio_error_message;
        app
    }

    /// Build the app around an existing instrument without touching disk.
    pub fn with_instrument(settings: PianoSettings, instrument: Option<ToneInstrument>) -> Self {
        let mut performer = NotePerformer::new(instrument);
        performer.set_chord_mode(settings.chord_mode_rules());
        performer.set_chords_enabled(settings.chord_mode);

        let mut app = Self {
            settings,
            settings_path: None,
            engine: None,
            audio_error_message: None,
            performer,
            keyboards: [PianoKeyboard::default(), PianoKeyboard::default()],
            orientation: Orientation::Horizontal,
            dual_piano: false,
            applied_dark: None,
        };
        app.sync_offsets();
        app
    }

    pub fn settings(&self) -> &PianoSettings {
        &self.settings
    }

    pub fn performer(&self) -> &NotePerformer<Option<ToneInstrument>> {
        &self.performer
    }

    pub fn keyboards(&self) -> &[PianoKeyboard; 2] {
        &self.keyboards
    }

    /// White keys visible across the shown keyboards.
    pub fn visible_white_keys(&self) -> usize {
        let per_keyboard = self.keyboards[0].params().visible_white_keys;
        if self.dual_piano {
            per_keyboard * 2
        } else {
            per_keyboard
        }
    }

    /// Apply toolbar changes. Returns whether settings changed.
    pub fn apply_actions(&mut self, actions: ToolbarActions) -> bool {
        let mut changed = false;

        if let Some(preset) = actions.instrument {
            if self.settings.instrument != preset.id {
                self.settings.instrument = preset.id.to_string();
                if let Some(instrument) = self.performer.instrument_mut() {
                    instrument.set_preset(preset);
                }
                changed = true;
            }
        }
        if let Some(key_size) = actions.key_size {
            if self.settings.key_size != key_size {
                self.settings.key_size = key_size;
                changed = true;
            }
        }
        if let Some(offset) = actions.offset {
            let offset = clamp_offset(offset).min(max_scroll_offset(self.visible_white_keys()));
            if self.settings.offset != offset {
                self.settings.offset = offset;
                changed = true;
            }
        }
        if actions.toggle_chord_mode {
            self.settings.chord_mode = !self.settings.chord_mode;
            self.performer.set_chords_enabled(self.settings.chord_mode);
            changed = true;
        }
        if actions.toggle_editing_chords {
            let editing = !self.performer.editing_chords();
            self.performer.set_editing_chords(editing);
        }
        if actions.toggle_dark {
            self.settings.dark = !self.settings.dark;
            changed = true;
        }

        // Chord editing changes qualities from key presses.
        if self.performer.chord_mode().qualities() != &self.settings.chord_mode_config {
            self.settings.chord_mode_config = self.performer.chord_mode().qualities().clone();
            changed = true;
        }

        if changed {
            self.sync_offsets();
            self.save_settings();
        }
        changed
    }

    /// Lift every pointer and stop anything still sounding.
    pub fn release_all(&mut self) {
        for keyboard in self.keyboards.iter_mut() {
            keyboard.release_all(&mut self.performer);
        }
        self.performer.silence();
    }

    fn sync_offsets(&mut self) {
        let offset = self.settings.offset;
        self.keyboards[0].set_offset(offset);
        let visible = self.keyboards[0].params().visible_white_keys as f32;
        self.keyboards[1].set_offset(offset + visible);
    }

    fn save_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        match save_to_file(&self.settings, path) {
            Ok(()) => log::debug!("Saved settings to {}", path.display()),
            Err(e) => log::warn!("Failed to save settings to {}: {}", path.display(), e),
        }
    }

    /// Draw the top toolbar
    fn draw_toolbar(&self, ui: &mut egui::Ui) -> ToolbarActions {
        let mut actions = ToolbarActions::default();
        let colors = theme::palette(self.settings.dark);

        ui.horizontal_wrapped(|ui| {
            ui.add_space(8.0);

            let current = self.settings.preset();
            egui::ComboBox::from_id_salt("instrument")
                .selected_text(current.title)
                .show_ui(ui, |ui| {
                    for category in categories() {
                        ui.label(RichText::new(category).color(colors.text_secondary).small());
                        for preset in presets_in(category) {
                            if ui
                                .selectable_label(preset.id == current.id, preset.title)
                                .clicked()
                            {
                                actions.instrument = Some(preset);
                            }
                        }
                    }
                });

            ui.separator();

            let chords_text = RichText::new("Chords").color(if self.settings.chord_mode {
                theme::accent::SUCCESS
            } else {
                colors.text_primary
            });
            if ui.selectable_label(self.settings.chord_mode, chords_text).clicked() {
                actions.toggle_chord_mode = true;
            }
            if self.settings.chord_mode {
                let editing = self.performer.editing_chords();
                let label = if editing { "Done" } else { "Edit chords" };
                if ui.selectable_label(editing, label).clicked() {
                    actions.toggle_editing_chords = true;
                }
            }

            ui.separator();

            egui::ComboBox::from_id_salt("key_size")
                .selected_text(self.settings.key_size.name())
                .show_ui(ui, |ui| {
                    for size in KeySize::ALL {
                        if ui
                            .selectable_label(size == self.settings.key_size, size.name())
                            .clicked()
                        {
                            actions.key_size = Some(size);
                        }
                    }
                });

            ui.separator();

            let max = max_scroll_offset(self.visible_white_keys());
            let mut offset = self.settings.offset.min(max);
            let offset_label = offset_to_note(offset).to_string();
            let slider = egui::Slider::new(&mut offset, 0.0..=max)
                .show_value(false)
                .text(offset_label);
            if ui.add(slider).changed() {
                actions.offset = Some(offset);
            }

            ui.separator();

            let theme_text = if self.settings.dark { "☀ Light" } else { "🌙 Dark" };
            if ui.button(theme_text).clicked() {
                actions.toggle_dark = true;
            }
        });

        actions
    }

    /// Draw the bottom status bar
    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        let colors = theme::palette(self.settings.dark);
        ui.horizontal(|ui| {
            ui.add_space(8.0);

            if let Some(ref error) = self.audio_error_message {
                ui.label(
                    RichText::new(format!("⚠ {}", error))
                        .color(theme::accent::ERROR)
                        .small(),
                );
            } else if let Some(engine) = &self.engine {
                ui.label(
                    RichText::new(format!(
                        "{} • {}Hz • {}ch",
                        engine.device_name(),
                        engine.sample_rate(),
                        engine.channels()
                    ))
                    .color(colors.text_secondary)
                    .small(),
                );
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if self.performer.editing_chords() {
                    ui.label(
                        RichText::new("Tap a key to switch major / minor")
                            .color(theme::accent::WARNING)
                            .small(),
                    );
                }
            });
        });
    }

    /// Draw the keyboards into the central panel
    fn draw_keyboards(&mut self, ui: &mut egui::Ui) {
        let rect = ui.available_rect_before_wrap();
        let (orientation, dual) = window_layout(rect.width(), rect.height());
        if (orientation, dual) != (self.orientation, self.dual_piano) {
            log::debug!("keyboard layout: {:?}, dual = {}", orientation, dual);
            self.orientation = orientation;
            self.dual_piano = dual;
        }

        let config = PianoConfig::default()
            .with_key_size(self.settings.key_size)
            .with_orientation(orientation)
            .with_colors(PianoColors::for_theme(self.settings.dark));

        let active = self.performer.active_notes().clone();
        let annotations = self.performer.annotations();
        let data = PianoData {
            active_notes: &active,
            annotations: &annotations,
        };

        let count = if dual { 2 } else { 1 };
        let rects = split_rect(rect, orientation, count);
        for (index, keyboard_rect) in rects.into_iter().enumerate() {
            let keyboard = &mut self.keyboards[index];
            ui.allocate_ui_at_rect(keyboard_rect, |ui| {
                piano(ui, keyboard, &data, &config, &mut self.performer);
            });
        }
        if !dual {
            self.keyboards[1].release_all(&mut self.performer);
        }

        self.sync_offsets();
    }
}

/// Split the piano area into stacked keyboards. The first rect holds the
/// lower notes: the bottom one when horizontal, the left one when vertical.
fn split_rect(rect: egui::Rect, orientation: Orientation, count: usize) -> Vec<egui::Rect> {
    let count = count.max(1);
    (0..count)
        .map(|i| {
            if orientation.is_vertical() {
                let w = rect.width() / count as f32;
                egui::Rect::from_min_size(
                    egui::pos2(rect.left() + w * i as f32, rect.top()),
                    egui::vec2(w, rect.height()),
                )
            } else {
                let h = rect.height() / count as f32;
                egui::Rect::from_min_size(
                    egui::pos2(rect.left(), rect.bottom() - h * (i + 1) as f32),
                    egui::vec2(rect.width(), h),
                )
            }
        })
        .collect()
}

/// Actions collected from the toolbar for deferred execution
#[derive(Default)]
pub struct ToolbarActions {
    pub instrument: Option<&'static InstrumentPreset>,
    pub key_size: Option<KeySize>,
    pub offset: Option<f32>,
    pub toggle_chord_mode: bool,
    pub toggle_editing_chords: bool,
    pub toggle_dark: bool,
}

impl eframe::App for PianoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.applied_dark != Some(self.settings.dark) {
            theme::apply_theme(ctx, self.settings.dark);
            self.applied_dark = Some(self.settings.dark);
        }
        let colors = theme::palette(self.settings.dark);

        let toolbar_actions = egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::none()
                    .fill(colors.panel)
                    .inner_margin(egui::Margin::symmetric(0.0, 8.0)),
            )
            .show(ctx, |ui| self.draw_toolbar(ui))
            .inner;

        egui::TopBottomPanel::bottom("status_bar")
            .frame(
                egui::Frame::none()
                    .fill(colors.panel)
                    .inner_margin(egui::Margin::symmetric(0.0, 4.0)),
            )
            .show(ctx, |ui| self.draw_status_bar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(colors.main))
            .show(ctx, |ui| self.draw_keyboards(ui));

        // Handle deferred actions (to avoid borrow checker issues)
        self.apply_actions(toolbar_actions);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.release_all();
        self.save_settings();
        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.stop() {
                log::warn!("{}", e);
            }
        }
    }
}
