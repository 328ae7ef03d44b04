//! egui front end for caretpad: the editor view with its line-number gutter
//! and custom caret, per-tab sessions, and the tabbed application shell.

mod app;
pub mod editor;
pub mod session;
mod tabs;

pub use app::{App, StartupArgs};
pub use session::{EditorSession, FramePaint, FrameRequest, SessionEvent, SessionOptions};
pub use tabs::TabManager;
