#![allow(dead_code)]

use std::path::Path;
use std::time::{Duration, Instant};

use caretpad_config::AppConfig;
use caretpad_ui::{App, EditorSession, SessionOptions, StartupArgs};
use egui_kittest::Harness;
use tempfile::TempDir;

/// Config that keeps every file the app writes inside `dir`.
pub fn test_config(dir: &Path) -> AppConfig {
    AppConfig {
        autosave_dir: dir.join("autosave").to_string_lossy().into_owned(),
        ..AppConfig::default()
    }
}

/// Creates a standard test harness with the app at 1024x768.
///
/// The returned `TempDir` holds the config and autosave files; keep it alive
/// for the length of the test.
pub fn create_harness() -> (Harness<'static, App>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let config_path = dir.path().join("caretpad.json");
    let harness = Harness::builder()
        .with_size(egui::Vec2::new(1024.0, 768.0))
        .with_step_dt(0.001)
        .build_eframe(move |cc| {
            App::from_config(&cc.egui_ctx, config, config_path, StartupArgs::default())
        });
    (harness, dir)
}

/// Options with short, round timer intervals for deterministic stepping.
pub fn fast_options() -> SessionOptions {
    let mut options = SessionOptions::default();
    options.caret.blink_interval = Duration::from_millis(500);
    options.redraw_interval = Duration::from_millis(10);
    options.autosave_delay = Duration::from_millis(800);
    options
}

/// A session autosaving into `dir`, with its clock starting at `now`.
pub fn session_in(dir: &Path, now: Instant) -> EditorSession {
    EditorSession::new("Untitled", dir, &fast_options(), now)
}
