//! Toolkit-free building blocks of the editor: the versioned text buffer,
//! the line-start cache, cooperative timers, redraw coalescing, autosave
//! and undo history.
pub mod autosave;
pub mod buffer;
pub mod history;
pub mod line_index;
pub mod redraw;
pub mod timer;

pub use autosave::Autosave;
pub use buffer::TextBuffer;
pub use history::{EditOperation, UndoHistory};
pub use line_index::LineIndexCache;
pub use redraw::{RedrawCoalescer, RedrawFlags};
pub use timer::{Scheduler, TimerId, TimerQueue};
