#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const APP_ID: &str = "caretpad";

/// A tabbed text editor with autosave, a line-number gutter and a custom caret.
///
/// Tabs from the previous run are restored first; FILES open as extra tabs.
#[derive(Parser, Debug)]
#[command(name = APP_ID, version, about)]
struct Cli {
    /// Files to open as tabs.
    files: Vec<PathBuf>,

    /// Open an untitled tab holding TEXT.
    #[arg(long = "new-file", value_name = "TEXT")]
    new_file: Option<String>,

    /// Read and write settings at PATH instead of the per-user config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter such as `debug` or `caretpad_ui=trace`. RUST_LOG wins when set.
    #[arg(long, value_name = "FILTER", default_value = "info")]
    log: String,
}

impl Cli {
    fn into_startup_args(self) -> caretpad_ui::StartupArgs {
        caretpad_ui::StartupArgs {
            files: self.files,
            new_file_text: self.new_file,
            config_path: self.config,
        }
    }
}

fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn window_options() -> eframe::NativeOptions {
    let viewport = egui::ViewportBuilder::default()
        .with_title(APP_ID)
        .with_app_id(APP_ID)
        .with_inner_size([1000.0, 700.0])
        .with_min_inner_size([400.0, 300.0]);
    eframe::NativeOptions {
        viewport,
        ..Default::default()
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "caretpad starting");

    let startup = cli.into_startup_args();
    eframe::run_native(
        APP_ID,
        window_options(),
        Box::new(move |cc| Ok(Box::new(caretpad_ui::App::new(cc, startup)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("editor window closed with an error")
}
