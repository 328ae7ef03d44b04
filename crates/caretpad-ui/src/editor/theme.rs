//! Editor theme configuration.
//!
//! Resolved egui colors and fonts for the text view, gutter and caret.

use std::time::Duration;

use caretpad_config::{AppConfig, EditorColors, HexColor};
use egui::{Color32, FontId};

/// Converts a straight-alpha `HexColor` to egui `Color32`.
pub(crate) fn hex_to_color32(c: HexColor) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Gutter colors and font.
#[derive(Debug, Clone, PartialEq)]
pub struct GutterStyle {
    pub width: f32,
    pub font_size: f32,
    pub background: Color32,
    pub separator: Color32,
    pub number: Color32,
    pub current_number: Color32,
    pub current_line: Color32,
}

/// Caret shape and timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaretStyle {
    pub width_scale: f32,
    pub height_scale: f32,
    pub color: Color32,
    pub blink_interval: Duration,
}

impl Default for CaretStyle {
    fn default() -> Self {
        Self {
            width_scale: 1.6,
            height_scale: 1.25,
            color: Color32::from_rgb(107, 199, 255),
            blink_interval: Duration::from_millis(750),
        }
    }
}

/// Configuration for the editor widget appearance.
#[derive(Debug, Clone)]
pub struct EditorTheme {
    pub font_size: f32,
    pub font_id: FontId,
    pub bg_color: Color32,
    pub text_color: Color32,
    pub selection_color: Color32,
    pub current_line_highlight: Color32,
    pub text_inset_y: f32,
    pub gutter: GutterStyle,
    pub caret: CaretStyle,
}

impl Default for EditorTheme {
    fn default() -> Self {
        Self::from_config(&AppConfig::default(), &EditorColors::dark())
    }
}

impl EditorTheme {
    /// Builds an `EditorTheme` from the config metrics and resolved colors.
    pub fn from_config(config: &AppConfig, colors: &EditorColors) -> Self {
        let current_line = hex_to_color32(colors.current_line_bg);
        Self {
            font_size: config.font_size,
            font_id: FontId::monospace(config.font_size),
            bg_color: hex_to_color32(colors.editor_bg),
            text_color: hex_to_color32(colors.editor_fg),
            selection_color: hex_to_color32(colors.selection_bg),
            current_line_highlight: current_line,
            text_inset_y: config.text_inset_y,
            gutter: GutterStyle {
                width: config.gutter_width,
                font_size: config.gutter_font_size(),
                background: hex_to_color32(colors.gutter_bg),
                separator: hex_to_color32(colors.gutter_separator),
                number: hex_to_color32(colors.gutter_fg),
                current_number: hex_to_color32(colors.current_line_number),
                current_line,
            },
            caret: CaretStyle {
                width_scale: config.caret_width_scale,
                height_scale: config.caret_height_scale,
                color: hex_to_color32(colors.caret),
                blink_interval: config.caret_blink_interval(),
            },
        }
    }

    /// Changes the text font size; the gutter follows at `size - 2` (min 11).
    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
        self.font_id = FontId::monospace(size);
        self.gutter.font_size = (size - 2.0).max(11.0);
    }
}
