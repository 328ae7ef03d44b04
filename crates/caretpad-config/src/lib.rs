pub mod color;
pub mod config;
pub mod theme;
pub mod workspace;

pub use color::HexColor;
pub use config::AppConfig;
pub use theme::{EditorColors, ThemeMode};
pub use workspace::{PersistedTab, WorkspaceState};
