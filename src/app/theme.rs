//! Theme definitions for the Virtual Piano UI
//!
//! Light and dark palettes for the toolbar and panels. Key colors live with
//! the piano widget.

use eframe::egui::{self, Color32, Rounding, Stroke, Vec2};

/// Panel and widget backgrounds for one theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub main: Color32,
    pub panel: Color32,
    pub widget: Color32,
    pub widget_hovered: Color32,
    pub widget_active: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_disabled: Color32,
}

/// Deep blue dark theme.
pub const DARK: Palette = Palette {
    main: Color32::from_rgb(26, 26, 46),
    panel: Color32::from_rgb(35, 35, 55),
    widget: Color32::from_rgb(45, 45, 70),
    widget_hovered: Color32::from_rgb(55, 55, 85),
    widget_active: Color32::from_rgb(65, 65, 100),
    text_primary: Color32::from_rgb(240, 240, 245),
    text_secondary: Color32::from_rgb(160, 160, 175),
    text_disabled: Color32::from_rgb(100, 100, 115),
};

/// Light gray theme.
pub const LIGHT: Palette = Palette {
    main: Color32::from_rgb(228, 228, 232),
    panel: Color32::from_rgb(245, 245, 248),
    widget: Color32::from_rgb(225, 225, 232),
    widget_hovered: Color32::from_rgb(210, 210, 222),
    widget_active: Color32::from_rgb(195, 195, 212),
    text_primary: Color32::from_rgb(30, 30, 40),
    text_secondary: Color32::from_rgb(90, 90, 105),
    text_disabled: Color32::from_rgb(150, 150, 160),
};

/// UI accent colors
pub mod accent {
    use super::Color32;

    /// Primary accent - blue
    pub const PRIMARY: Color32 = Color32::from_rgb(66, 165, 245);

    /// Success/active - green
    pub const SUCCESS: Color32 = Color32::from_rgb(129, 199, 132);

    /// Warning - orange
    pub const WARNING: Color32 = Color32::from_rgb(255, 183, 77);

    /// Error - red
    pub const ERROR: Color32 = Color32::from_rgb(239, 83, 80);
}

/// Smaller rounding for compact elements
pub const ROUNDING_SMALL: Rounding = Rounding {
    nw: 4.0,
    ne: 4.0,
    sw: 4.0,
    se: 4.0,
};

pub fn palette(dark: bool) -> &'static Palette {
    if dark {
        &DARK
    } else {
        &LIGHT
    }
}

/// Apply the light or dark theme to an egui context
pub fn apply_theme(ctx: &egui::Context, dark: bool) {
    let colors = palette(dark);
    let mut style = (*ctx.style()).clone();

    style.visuals = if dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    let visuals = &mut style.visuals;

    visuals.panel_fill = colors.main;
    visuals.window_fill = colors.panel;

    visuals.widgets.noninteractive.bg_fill = colors.widget;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, colors.text_secondary);
    visuals.widgets.noninteractive.rounding = ROUNDING_SMALL;

    visuals.widgets.inactive.bg_fill = colors.widget;
    visuals.widgets.inactive.weak_bg_fill = colors.widget;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, colors.text_primary);
    visuals.widgets.inactive.rounding = ROUNDING_SMALL;

    visuals.widgets.hovered.bg_fill = colors.widget_hovered;
    visuals.widgets.hovered.weak_bg_fill = colors.widget_hovered;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, colors.text_primary);
    visuals.widgets.hovered.rounding = ROUNDING_SMALL;

    visuals.widgets.active.bg_fill = colors.widget_active;
    visuals.widgets.active.weak_bg_fill = colors.widget_active;
    visuals.widgets.active.fg_stroke = Stroke::new(1.5, accent::PRIMARY);
    visuals.widgets.active.rounding = ROUNDING_SMALL;

    visuals.selection.bg_fill = accent::PRIMARY.gamma_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, accent::PRIMARY);

    style.spacing.item_spacing = Vec2::new(8.0, 6.0);
    style.spacing.button_padding = Vec2::new(10.0, 5.0);

    ctx.set_style(style);
}
