//! Layout cache for the editor widget.
//!
//! Keeps the last [`MonospaceLayout`] so frames without edits, resizes or
//! zoom changes skip the rebuild.

use caretpad_core::TextBuffer;

use super::layout::{LayoutMetrics, MonospaceLayout};

/// Per-session layout cache keyed by buffer version and metrics.
#[derive(Debug, Default)]
pub struct LayoutCache {
    layout: Option<MonospaceLayout>,
    /// Buffer version the layout was built for.
    last_version: u64,
    builds: u64,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached layout, rebuilding it if the text or metrics changed.
    pub fn get_or_build(&mut self, text: &TextBuffer, metrics: LayoutMetrics) -> &MonospaceLayout {
        let stale = match &self.layout {
            Some(layout) => self.last_version != text.version() || *layout.metrics() != metrics,
            None => true,
        };
        if stale {
            self.last_version = text.version();
            self.builds += 1;
            self.layout = Some(MonospaceLayout::build(text, metrics));
        }
        self.layout
            .get_or_insert_with(|| MonospaceLayout::build(text, metrics))
    }

    /// The layout from the last frame, if any.
    pub fn current(&self) -> Option<&MonospaceLayout> {
        self.layout.as_ref()
    }

    /// Forces a rebuild on the next frame (font size changes).
    pub fn invalidate(&mut self) {
        self.layout = None;
    }

    pub fn build_count(&self) -> u64 {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use egui::Vec2;

    use super::*;

    fn metrics(char_width: f32) -> LayoutMetrics {
        LayoutMetrics {
            char_width,
            line_height: 20.0,
            container_width: 300.0,
            inset: Vec2::new(0.0, 10.0),
            wrap_column: None,
        }
    }

    #[test]
    fn reuses_layout_until_something_changes() {
        let mut text = TextBuffer::from("abc");
        let mut cache = LayoutCache::new();

        cache.get_or_build(&text, metrics(8.0));
        cache.get_or_build(&text, metrics(8.0));
        assert_eq!(cache.build_count(), 1);

        text.insert(3, "\n").unwrap();
        cache.get_or_build(&text, metrics(8.0));
        assert_eq!(cache.build_count(), 2);

        cache.get_or_build(&text, metrics(9.0));
        assert_eq!(cache.build_count(), 3);

        cache.invalidate();
        assert!(cache.current().is_none());
        cache.get_or_build(&text, metrics(9.0));
        assert_eq!(cache.build_count(), 4);
    }
}
