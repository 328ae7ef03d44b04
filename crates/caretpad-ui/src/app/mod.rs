//! Main application: tab strip on top, the active editor session below.

mod file_ops;
mod shortcuts;
mod tab_bar;

use std::path::PathBuf;
use std::time::Instant;

use caretpad_config::{AppConfig, ThemeMode};
use eframe::egui;

use crate::editor::{EditorTheme, EditorWidget};
use crate::session::{SessionEvent, SessionOptions};
use crate::tabs::TabManager;

/// Smallest and largest editor font size reachable by zooming.
const MIN_FONT_SIZE: f32 = 6.0;
const MAX_FONT_SIZE: f32 = 72.0;
/// Font size change per zoom step.
const ZOOM_STEP: f32 = 1.0;

/// Command-line arguments passed into the app at startup.
#[derive(Debug, Default)]
pub struct StartupArgs {
    /// Files to open as tabs.
    pub files: Vec<PathBuf>,
    /// Text for an extra untitled tab.
    pub new_file_text: Option<String>,
    /// Config file to use instead of the default location.
    pub config_path: Option<PathBuf>,
}

/// The caretpad application state.
pub struct App {
    tabs: TabManager,
    theme: EditorTheme,
    config: AppConfig,
    config_path: PathBuf,
    last_window_title: String,
}

/// True unless the OS reports a light preference.
fn os_prefers_dark() -> bool {
    !matches!(dark_light::detect(), Ok(dark_light::Mode::Light))
}

fn is_dark(mode: ThemeMode, os_dark: bool) -> bool {
    match mode {
        ThemeMode::System => os_dark,
        ThemeMode::Light => false,
        ThemeMode::Dark => true,
    }
}

impl App {
    /// Creates the app, loading config from `args.config_path` or the default
    /// location.
    pub fn new(cc: &eframe::CreationContext<'_>, args: StartupArgs) -> Self {
        let config_path = args
            .config_path
            .clone()
            .unwrap_or_else(AppConfig::config_path);
        let config = AppConfig::load_or_create(&config_path);
        Self::from_config(&cc.egui_ctx, config, config_path, args)
    }

    /// Creates the app from an already loaded config.
    pub fn from_config(
        ctx: &egui::Context,
        config: AppConfig,
        config_path: PathBuf,
        args: StartupArgs,
    ) -> Self {
        // Ctrl+/- change the editor font, not the UI scale.
        ctx.options_mut(|o| o.zoom_with_keyboard = false);

        let os_dark = os_prefers_dark();
        let colors = config.colors(os_dark);
        let theme = EditorTheme::from_config(&config, &colors);
        ctx.set_visuals(if is_dark(config.theme, os_dark) {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        let autosave_dir = config.resolve_autosave_dir();
        tracing::info!(dir = %autosave_dir.display(), "autosave directory");
        let mut tabs = TabManager::restore(autosave_dir, SessionOptions::new(&theme, &config));

        for path in &args.files {
            let abs_path = if path.is_absolute() {
                path.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(path)
            };
            if let Err(e) = tabs.open_file(&abs_path) {
                tracing::warn!("Failed to open '{}': {e:#}", abs_path.display());
            }
        }

        if let Some(text) = args.new_file_text {
            tabs.new_tab();
            tabs.active_session_mut().insert_text(&text);
        }

        Self {
            tabs,
            theme,
            config,
            config_path,
            last_window_title: String::new(),
        }
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut TabManager {
        &mut self.tabs
    }

    pub fn theme(&self) -> &EditorTheme {
        &self.theme
    }

    pub fn font_size(&self) -> f32 {
        self.theme.font_size
    }

    pub fn new_tab(&mut self) {
        self.tabs.new_tab();
    }

    pub fn close_tab(&mut self, idx: usize) {
        self.tabs.close_tab(idx);
    }

    pub fn zoom_in(&mut self) {
        self.set_font_size(self.theme.font_size + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_font_size(self.theme.font_size - ZOOM_STEP);
    }

    /// Changes the editor font for every tab and persists it.
    pub fn set_font_size(&mut self, size: f32) {
        let size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        if (size - self.theme.font_size).abs() < f32::EPSILON {
            return;
        }
        self.theme.set_font_size(size);
        self.tabs.broadcast(SessionEvent::FontSizeChanged(size));
        self.config.font_size = size;
        if let Err(e) = self.config.save(&self.config_path) {
            tracing::warn!("Failed to save config: {e:#}");
        }
    }

    fn update_window_title(&mut self, ctx: &egui::Context) {
        let title = format!("{} - caretpad", self.tabs.active_session().title);
        if title != self.last_window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_window_title = title;
        }
    }

    /// Lets background tabs run their autosave timers.
    fn advance_background_tabs(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let active = self.tabs.active;
        let mut next = None;
        for (idx, session) in self.tabs.sessions.iter_mut().enumerate() {
            if idx == active {
                continue;
            }
            session.advance(now);
            next = match (next, session.time_until_next_timer()) {
                (Some(a), Some(b)) => Some(std::cmp::min(a, b)),
                (a, b) => a.or(b),
            };
        }
        if let Some(wait) = next {
            ctx.request_repaint_after(wait);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_zoom_factor(1.0);

        self.handle_global_shortcuts(ctx);
        self.update_window_title(ctx);

        let faint_bg = ctx.style().visuals.faint_bg_color;
        egui::TopBottomPanel::top("tab_bar")
            .frame(
                egui::Frame::new()
                    .fill(faint_bg)
                    .inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                self.show_tab_bar(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(self.theme.bg_color))
            .show(ctx, |ui| {
                let session = self.tabs.active_session_mut();
                EditorWidget::new(session, &self.theme, self.config.word_wrap).show(ui);
            });

        self.advance_background_tabs(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.tabs.close_all();
        if let Err(e) = self.config.save(&self.config_path) {
            tracing::warn!("Failed to save config on exit: {e:#}");
        }
    }
}
