//! Application configuration: load, save and sanitize.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::theme::{EditorColors, ThemeMode};

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme: ThemeMode,
    /// Text font size in points; the gutter uses `font_size - 2` (min 11).
    pub font_size: f32,
    pub gutter_width: f32,
    /// Top inset between the view edge and the first line.
    pub text_inset_y: f32,
    pub caret_width_scale: f32,
    pub caret_height_scale: f32,
    pub caret_blink_ms: u64,
    pub redraw_interval_ms: u64,
    pub autosave_delay_ms: u64,
    /// Autosave directory. Empty = platform data dir.
    pub autosave_dir: String,
    /// Soft-wrap the text at the view width.
    pub word_wrap: bool,
    /// Overrides the preset colors when set.
    pub custom_colors: Option<EditorColors>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            font_size: 14.0,
            gutter_width: 56.0,
            text_inset_y: 10.0,
            caret_width_scale: 1.6,
            caret_height_scale: 1.25,
            caret_blink_ms: 750,
            redraw_interval_ms: 16,
            autosave_delay_ms: 800,
            autosave_dir: String::new(),
            word_wrap: true,
            custom_colors: None,
        }
    }
}

impl AppConfig {
    /// Returns the config file path: exe directory + `caretpad.json`.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("caretpad.json")))
            .unwrap_or_else(|| PathBuf::from("caretpad.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Falls back to defaults (without overwriting the file) on read or parse errors.
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e:#}", path.display());
            }
            return config;
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config at {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    /// Reads and sanitizes the config at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut config: AppConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.sanitize();
        Ok(config)
    }

    /// Saves config to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    /// Clamps values to valid ranges.
    pub fn sanitize(&mut self) {
        self.font_size = self.font_size.clamp(6.0, 72.0);
        self.gutter_width = self.gutter_width.clamp(24.0, 200.0);
        self.text_inset_y = self.text_inset_y.clamp(0.0, 100.0);
        self.caret_width_scale = self.caret_width_scale.max(1.0);
        self.caret_height_scale = self.caret_height_scale.max(1.0);
        self.caret_blink_ms = self.caret_blink_ms.clamp(100, 5000);
        self.redraw_interval_ms = self.redraw_interval_ms.clamp(1, 100);
        self.autosave_delay_ms = self.autosave_delay_ms.max(100);
    }

    /// Font size for gutter labels.
    pub fn gutter_font_size(&self) -> f32 {
        (self.font_size - 2.0).max(11.0)
    }

    pub fn caret_blink_interval(&self) -> Duration {
        Duration::from_millis(self.caret_blink_ms)
    }

    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.redraw_interval_ms)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Directory that holds per-tab autosave files.
    ///
    /// Resolution order:
    /// 1. `autosave_dir` when non-empty
    /// 2. `<platform data dir>/caretpad`
    /// 3. `.caretpad` in the working directory
    pub fn resolve_autosave_dir(&self) -> PathBuf {
        if !self.autosave_dir.is_empty() {
            return PathBuf::from(&self.autosave_dir);
        }
        dirs::data_dir()
            .map(|d| d.join("caretpad"))
            .unwrap_or_else(|| PathBuf::from(".caretpad"))
    }

    /// Colors to use, honoring `custom_colors` over the preset.
    pub fn colors(&self, os_dark: bool) -> EditorColors {
        self.custom_colors
            .clone()
            .unwrap_or_else(|| EditorColors::for_mode(self.theme, os_dark))
    }
}
