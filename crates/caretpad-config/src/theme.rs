//! Editor color presets.

use serde::{Deserialize, Serialize};

use crate::color::HexColor;

/// Which preset the editor uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeMode {
    /// Follows the OS light/dark preference with accent-tinted highlights.
    #[default]
    System,
    Light,
    Dark,
}

/// Colors for the text view, gutter and caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorColors {
    pub editor_bg: HexColor,
    pub editor_fg: HexColor,
    pub gutter_bg: HexColor,
    pub gutter_fg: HexColor,
    pub gutter_separator: HexColor,
    pub current_line_bg: HexColor,
    pub current_line_number: HexColor,
    pub caret: HexColor,
    pub selection_bg: HexColor,
}

impl Default for EditorColors {
    fn default() -> Self {
        Self::dark()
    }
}

impl EditorColors {
    pub fn light() -> Self {
        Self {
            editor_bg: HexColor::gray(0.98, 1.0),
            editor_fg: HexColor::gray(0.1, 1.0),
            gutter_bg: HexColor::gray(0.94, 1.0),
            gutter_fg: HexColor::gray(0.38, 1.0),
            gutter_separator: HexColor::gray(0.82, 1.0),
            current_line_bg: HexColor::from_unit(0.76, 0.85, 1.0, 0.30),
            current_line_number: HexColor::gray(0.1, 1.0),
            caret: HexColor::from_unit(0.05, 0.40, 0.95, 1.0),
            selection_bg: HexColor::from_unit(0.64, 0.78, 1.0, 0.55),
        }
    }

    pub fn dark() -> Self {
        Self {
            editor_bg: HexColor::gray(0.10, 1.0),
            editor_fg: HexColor::from_unit(0.60, 0.63, 0.68, 1.0),
            gutter_bg: HexColor::gray(0.14, 1.0),
            gutter_fg: HexColor::gray(0.55, 1.0),
            gutter_separator: HexColor::gray(0.24, 1.0),
            current_line_bg: HexColor::from_unit(0.30, 0.48, 0.80, 0.30),
            current_line_number: HexColor::gray(0.95, 1.0),
            caret: HexColor::from_unit(0.42, 0.78, 1.00, 1.0),
            selection_bg: HexColor::from_unit(0.25, 0.40, 0.65, 0.60),
        }
    }

    /// OS-following preset: light or dark base with an accent-tinted highlight.
    pub fn system(dark_mode: bool) -> Self {
        let base = if dark_mode { Self::dark() } else { Self::light() };
        let accent = HexColor::from_unit(0.0, 0.48, 1.0, 1.0);
        Self {
            current_line_bg: accent.with_alpha(0.14),
            caret: HexColor::from_unit(0.29, 0.62, 1.00, 1.0),
            ..base
        }
    }

    /// Resolves a mode to concrete colors; `os_dark` is only read for `System`.
    pub fn for_mode(mode: ThemeMode, os_dark: bool) -> Self {
        match mode {
            ThemeMode::System => Self::system(os_dark),
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_resolution() {
        assert_eq!(EditorColors::for_mode(ThemeMode::Light, true), EditorColors::light());
        assert_eq!(EditorColors::for_mode(ThemeMode::Dark, false), EditorColors::dark());
        let sys = EditorColors::for_mode(ThemeMode::System, true);
        assert_eq!(sys.editor_bg, EditorColors::dark().editor_bg);
        assert_eq!(sys.current_line_bg.a, 36);
    }

    #[test]
    fn partial_json_fills_from_default() {
        let colors: EditorColors = serde_json::from_str(r##"{"caret": "#FF0000"}"##).unwrap();
        assert_eq!(colors.caret, HexColor::rgb(255, 0, 0));
        assert_eq!(colors.gutter_bg, EditorColors::dark().gutter_bg);
    }
}
