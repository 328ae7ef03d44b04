pub mod caret;
pub mod damage;
pub mod gutter;
mod input;
pub mod layout;
pub(crate) mod layout_cache;
pub(crate) mod theme;
mod widget;

pub use caret::{CaretController, CaretPaint, CaretState};
pub use damage::Damage;
pub use gutter::{GutterPaint, GutterRenderer, GutterViewport, LabelMeasurer};
pub use layout::{LayoutMetrics, MonospaceLayout, TextLayout};
pub use theme::{CaretStyle, EditorTheme, GutterStyle};
pub use widget::EditorWidget;
