//! Line-number gutter.
//!
//! [`GutterRenderer::render`] turns the visible part of a [`TextLayout`] into
//! a list of [`GutterPaint`] commands in screen coordinates; the widget hands
//! them to an `egui::Painter`. Line numbers come from a [`LineIndexCache`] and
//! label sizes are measured once per line number and font size.

use std::collections::HashMap;
use std::ops::Range;

use caretpad_core::{LineIndexCache, TextBuffer};
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Ui, Vec2};

use super::layout::TextLayout;
use super::theme::GutterStyle;

/// Minimum height of a highlight band.
const MIN_BAND_HEIGHT: f32 = 16.0;

/// Background fill and separator always come first.
const BACKGROUND_COMMANDS: usize = 2;

/// Measures label text at a font size.
pub trait LabelMeasurer {
    fn measure(&mut self, label: &str, font_size: f32) -> Vec2;
}

/// Measures with the fonts of a live egui `Ui`.
pub struct UiMeasurer<'a> {
    ui: &'a Ui,
}

impl<'a> UiMeasurer<'a> {
    pub fn new(ui: &'a Ui) -> Self {
        Self { ui }
    }
}

impl LabelMeasurer for UiMeasurer<'_> {
    fn measure(&mut self, label: &str, font_size: f32) -> Vec2 {
        let job = egui::text::LayoutJob::simple_singleline(
            label.to_string(),
            FontId::monospace(font_size),
            Color32::WHITE,
        );
        let galley = self.ui.fonts_mut(|f| f.layout_job(job));
        galley.rect.size()
    }
}

/// One gutter drawing operation, in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum GutterPaint {
    Fill {
        rect: Rect,
        color: Color32,
    },
    /// 1px vertical line at `x` from `top` to `bottom`.
    Separator {
        x: f32,
        top: f32,
        bottom: f32,
        color: Color32,
    },
    Label {
        line: usize,
        /// Top-left of the label text.
        pos: Pos2,
        color: Color32,
        highlighted: bool,
    },
}

/// Where the gutter sits and which part of the text view it mirrors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GutterViewport {
    /// Gutter area on screen.
    pub bounds: Rect,
    /// Visible rect of the text view, in view coordinates.
    pub visible: Rect,
}

/// Computes gutter paint commands, caching line starts and label sizes.
#[derive(Debug)]
pub struct GutterRenderer {
    style: GutterStyle,
    lines: LineIndexCache,
    label_sizes: HashMap<usize, Vec2>,
    measured_font_size: f32,
}

impl GutterRenderer {
    pub fn new(style: GutterStyle) -> Self {
        Self {
            measured_font_size: style.font_size,
            style,
            lines: LineIndexCache::new(),
            label_sizes: HashMap::new(),
        }
    }

    pub fn style(&self) -> &GutterStyle {
        &self.style
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.style.font_size = size;
        if (self.measured_font_size - size).abs() > f32::EPSILON {
            self.label_sizes.clear();
            self.measured_font_size = size;
        }
    }

    /// Clears the line table and label sizes. Calling it repeatedly is a no-op.
    pub fn invalidate_caches(&mut self) {
        self.lines.invalidate();
        self.label_sizes.clear();
    }

    /// Line-start table shared with the caret's current-line band.
    pub fn lines_mut(&mut self) -> &mut LineIndexCache {
        &mut self.lines
    }

    pub fn cached_label_count(&self) -> usize {
        self.label_sizes.len()
    }

    /// Produces the commands for one gutter frame.
    ///
    /// The line containing `caret_offset` gets a full-width highlight band.
    /// If the layout hasn't produced a fragment for a visible glyph yet, only
    /// the background is returned.
    pub fn render(
        &mut self,
        viewport: &GutterViewport,
        layout: &impl TextLayout,
        text: &TextBuffer,
        caret_offset: usize,
        measurer: &mut impl LabelMeasurer,
    ) -> Vec<GutterPaint> {
        let bounds = viewport.bounds;
        let mut out = vec![
            GutterPaint::Fill {
                rect: bounds,
                color: self.style.background,
            },
            GutterPaint::Separator {
                x: bounds.max.x - 0.5,
                top: bounds.min.y,
                bottom: bounds.max.y,
                color: self.style.separator,
            },
        ];

        let inset = layout.container_inset();
        // Screen y of container y = 0.
        let origin_y = bounds.min.y + inset.y - viewport.visible.min.y;
        let glyphs = layout.glyph_range_for_rect(viewport.visible.translate(-inset));
        let current_line = self.lines.line_number(text, caret_offset);

        if text.is_empty() {
            let size = self.label_size(1, measurer);
            self.push_label(&mut out, bounds, 1, origin_y, size.y, true, size);
            return out;
        }

        let mut drawn: Range<usize> = 0..0;
        if !glyphs.is_empty() {
            let first_char = layout.char_index_for_glyph(glyphs.start);
            let mut line = self.lines.line_number(text, first_char);
            drawn = line..line;
            let mut glyph = glyphs.start;
            while glyph < glyphs.end {
                let Some(chars) = self.lines.line_range(text, line) else {
                    break;
                };
                let line_glyphs = layout.glyph_range_for_chars(chars);
                // Anchor on the line's first fragment, even when it is scrolled off.
                let Some(fragment) = layout.line_fragment_rect(line_glyphs.start) else {
                    tracing::trace!(glyph, "line fragment not laid out, skipping gutter labels");
                    out.truncate(BACKGROUND_COMMANDS);
                    return out;
                };
                let size = self.label_size(line, measurer);
                self.push_label(
                    &mut out,
                    bounds,
                    line,
                    origin_y + fragment.min.y,
                    fragment.height(),
                    line == current_line,
                    size,
                );
                drawn.end = line + 1;
                glyph = line_glyphs.end.max(glyph + 1);
                line += 1;
            }
        }

        if text.ends_with_newline() {
            let trailing = self.lines.line_count(text);
            if !drawn.contains(&trailing) {
                if let Some(extra) = layout.extra_line_fragment_rect() {
                    let local_y = extra.min.y + inset.y - viewport.visible.min.y;
                    if local_y + extra.height() >= 0.0 && local_y <= bounds.height() {
                        let size = self.label_size(trailing, measurer);
                        self.push_label(
                            &mut out,
                            bounds,
                            trailing,
                            bounds.min.y + local_y,
                            extra.height(),
                            trailing == current_line,
                            size,
                        );
                    }
                }
            }
        }

        out
    }

    fn label_size(&mut self, line: usize, measurer: &mut impl LabelMeasurer) -> Vec2 {
        let font_size = self.style.font_size;
        *self
            .label_sizes
            .entry(line)
            .or_insert_with(|| measurer.measure(&line.to_string(), font_size))
    }

    #[allow(clippy::too_many_arguments)]
    fn push_label(
        &self,
        out: &mut Vec<GutterPaint>,
        bounds: Rect,
        line: usize,
        y: f32,
        row_height: f32,
        highlighted: bool,
        size: Vec2,
    ) {
        if highlighted {
            out.push(GutterPaint::Fill {
                rect: Rect::from_min_size(
                    Pos2::new(bounds.min.x, y),
                    Vec2::new(bounds.width(), row_height.max(MIN_BAND_HEIGHT)),
                ),
                color: self.style.current_line,
            });
        }
        let x = bounds.min.x + ((bounds.width() - size.x) / 2.0).max(0.0);
        out.push(GutterPaint::Label {
            line,
            pos: Pos2::new(x, y),
            color: if highlighted {
                self.style.current_number
            } else {
                self.style.number
            },
            highlighted,
        });
    }
}

/// Draws gutter commands with `painter`, clipped to the gutter.
pub fn paint_gutter(painter: &Painter, commands: &[GutterPaint], font_id: &FontId) {
    for command in commands {
        match command {
            GutterPaint::Fill { rect, color } => {
                painter.rect_filled(*rect, 0.0, *color);
            }
            GutterPaint::Separator {
                x,
                top,
                bottom,
                color,
            } => {
                painter.line_segment(
                    [Pos2::new(*x, *top), Pos2::new(*x, *bottom)],
                    Stroke::new(1.0, *color),
                );
            }
            GutterPaint::Label {
                line, pos, color, ..
            } => {
                painter.text(
                    *pos,
                    Align2::LEFT_TOP,
                    line.to_string(),
                    font_id.clone(),
                    *color,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::layout::{LayoutMetrics, MonospaceLayout};

    /// Fixed-size measurer that counts calls.
    #[derive(Default)]
    struct CountingMeasurer {
        calls: usize,
    }

    impl LabelMeasurer for CountingMeasurer {
        fn measure(&mut self, label: &str, font_size: f32) -> Vec2 {
            self.calls += 1;
            Vec2::new(label.len() as f32 * 7.0, font_size)
        }
    }

    fn style() -> GutterStyle {
        GutterStyle {
            width: 56.0,
            font_size: 12.0,
            background: Color32::from_gray(36),
            separator: Color32::from_gray(61),
            number: Color32::from_gray(140),
            current_number: Color32::from_gray(242),
            current_line: Color32::from_rgb(77, 122, 204),
        }
    }

    fn metrics() -> LayoutMetrics {
        LayoutMetrics {
            char_width: 8.0,
            line_height: 20.0,
            container_width: 400.0,
            inset: Vec2::new(0.0, 10.0),
            wrap_column: None,
        }
    }

    fn viewport(scroll_y: f32) -> GutterViewport {
        GutterViewport {
            bounds: Rect::from_min_size(Pos2::new(0.0, 30.0), Vec2::new(56.0, 200.0)),
            visible: Rect::from_min_size(Pos2::new(0.0, scroll_y), Vec2::new(400.0, 200.0)),
        }
    }

    fn labels(commands: &[GutterPaint]) -> Vec<(usize, f32, bool)> {
        commands
            .iter()
            .filter_map(|c| match c {
                GutterPaint::Label {
                    line,
                    pos,
                    highlighted,
                    ..
                } => Some((*line, pos.y, *highlighted)),
                _ => None,
            })
            .collect()
    }

    fn render(text: &str, caret: usize, scroll_y: f32) -> Vec<GutterPaint> {
        let buffer = TextBuffer::from(text);
        let layout = MonospaceLayout::build(&buffer, metrics());
        let mut gutter = GutterRenderer::new(style());
        gutter.render(
            &viewport(scroll_y),
            &layout,
            &buffer,
            caret,
            &mut CountingMeasurer::default(),
        )
    }

    /// Layout that knows glyphs exist but has no fragments yet.
    struct UnlaidLayout;

    impl TextLayout for UnlaidLayout {
        fn glyph_range_for_rect(&self, _rect: Rect) -> Range<usize> {
            0..3
        }
        fn char_index_for_glyph(&self, glyph: usize) -> usize {
            glyph
        }
        fn glyph_range_for_chars(&self, chars: Range<usize>) -> Range<usize> {
            chars
        }
        fn line_fragment_rect(&self, _glyph: usize) -> Option<Rect> {
            None
        }
        fn extra_line_fragment_rect(&self) -> Option<Rect> {
            None
        }
        fn container_inset(&self) -> Vec2 {
            Vec2::ZERO
        }
        fn insertion_point_rect(&self, _char_index: usize) -> Option<Rect> {
            None
        }
    }

    #[test]
    fn background_precedes_labels() {
        let commands = render("a\nb", 0, 0.0);
        assert!(matches!(commands[0], GutterPaint::Fill { rect, .. } if rect == viewport(0.0).bounds));
        assert!(matches!(commands[1], GutterPaint::Separator { x, .. } if (x - 55.5).abs() < 1e-3));
    }

    #[test]
    fn empty_document_draws_highlighted_one() {
        let commands = render("", 0, 0.0);
        assert_eq!(labels(&commands), vec![(1, 40.0, true)]);
        let band = commands.iter().find_map(|c| match c {
            GutterPaint::Fill { rect, color } if *color == style().current_line => Some(*rect),
            _ => None,
        });
        assert_eq!(band.map(|r| r.height()), Some(16.0));
    }

    #[test]
    fn trailing_newline_draws_two_labels() {
        let commands = render("x\n", 0, 0.0);
        assert_eq!(labels(&commands), vec![(1, 40.0, true), (2, 60.0, false)]);
    }

    #[test]
    fn caret_on_trailing_line_highlights_it() {
        let commands = render("x\n", 2, 0.0);
        assert_eq!(labels(&commands), vec![(1, 40.0, false), (2, 60.0, true)]);
    }

    #[test]
    fn labels_follow_scroll_and_visible_range() {
        let text: String = (0..30).map(|i| format!("line {i}\n")).collect();
        // Scrolled by 5 rows: container y 90.. is visible, first row 4.
        let commands = render(&text, 0, 100.0);
        let labels = labels(&commands);
        assert_eq!(labels.first().map(|l| l.0), Some(5));
        assert_eq!(labels.first().map(|l| l.1), Some(30.0 + 10.0 + 80.0 - 100.0));
        assert!(labels.iter().all(|l| !l.2));
        assert!(labels.len() <= 12);
        // Consecutive numbering.
        for pair in labels.windows(2) {
            assert_eq!(pair[1].0, pair[0].0 + 1);
        }
    }

    #[test]
    fn wrapped_line_gets_one_label() {
        let buffer = TextBuffer::from("abcdefghij\nk");
        let layout = MonospaceLayout::build(
            &buffer,
            LayoutMetrics {
                wrap_column: Some(4),
                ..metrics()
            },
        );
        let mut gutter = GutterRenderer::new(style());
        let commands = gutter.render(
            &viewport(0.0),
            &layout,
            &buffer,
            11,
            &mut CountingMeasurer::default(),
        );
        // Line 1 spans three rows; line 2 starts on the fourth.
        assert_eq!(labels(&commands), vec![(1, 40.0, false), (2, 100.0, true)]);
    }

    #[test]
    fn partly_scrolled_wrapped_line_keeps_label_on_first_row() {
        let buffer = TextBuffer::from("abcdefghij\nk");
        let layout = MonospaceLayout::build(
            &buffer,
            LayoutMetrics {
                wrap_column: Some(4),
                ..metrics()
            },
        );
        let mut gutter = GutterRenderer::new(style());
        // Row 0 of line 1 is above the viewport; row 1 is the first visible.
        let commands = gutter.render(
            &viewport(35.0),
            &layout,
            &buffer,
            11,
            &mut CountingMeasurer::default(),
        );
        assert_eq!(
            labels(&commands),
            vec![(1, 30.0 + 10.0 - 35.0, false), (2, 30.0 + 10.0 + 60.0 - 35.0, true)]
        );
    }

    #[test]
    fn labels_are_centered() {
        let commands = render("a", 0, 0.0);
        let x = commands.iter().find_map(|c| match c {
            GutterPaint::Label { pos, .. } => Some(pos.x),
            _ => None,
        });
        // "1" measures 7 wide.
        assert_eq!(x, Some(24.5));
    }

    #[test]
    fn unlaid_layout_paints_background_only() {
        let buffer = TextBuffer::from("abc");
        let mut gutter = GutterRenderer::new(style());
        let commands = gutter.render(
            &viewport(0.0),
            &UnlaidLayout,
            &buffer,
            0,
            &mut CountingMeasurer::default(),
        );
        assert_eq!(commands.len(), BACKGROUND_COMMANDS);
    }

    #[test]
    fn label_sizes_are_cached_per_font_size() {
        let buffer = TextBuffer::from("a\nb\nc");
        let layout = MonospaceLayout::build(&buffer, metrics());
        let mut gutter = GutterRenderer::new(style());
        let mut measurer = CountingMeasurer::default();

        gutter.render(&viewport(0.0), &layout, &buffer, 0, &mut measurer);
        gutter.render(&viewport(0.0), &layout, &buffer, 0, &mut measurer);
        assert_eq!(measurer.calls, 3);

        gutter.set_font_size(12.0);
        gutter.render(&viewport(0.0), &layout, &buffer, 0, &mut measurer);
        assert_eq!(measurer.calls, 3);

        gutter.set_font_size(16.0);
        assert_eq!(gutter.cached_label_count(), 0);
        gutter.render(&viewport(0.0), &layout, &buffer, 0, &mut measurer);
        assert_eq!(measurer.calls, 6);
    }

    #[test]
    fn invalidate_caches_is_idempotent() {
        let buffer = TextBuffer::from("a\nb");
        let layout = MonospaceLayout::build(&buffer, metrics());
        let mut gutter = GutterRenderer::new(style());
        let mut measurer = CountingMeasurer::default();
        let first = gutter.render(&viewport(0.0), &layout, &buffer, 0, &mut measurer);

        gutter.invalidate_caches();
        gutter.invalidate_caches();
        assert_eq!(gutter.cached_label_count(), 0);
        assert!(!gutter.lines_mut().is_fresh(&buffer));

        let again = gutter.render(&viewport(0.0), &layout, &buffer, 0, &mut measurer);
        assert_eq!(first, again);
    }

    #[test]
    fn edits_are_picked_up_on_next_render() {
        let mut buffer = TextBuffer::from("a\nb");
        let mut gutter = GutterRenderer::new(style());
        let mut measurer = CountingMeasurer::default();
        let layout = MonospaceLayout::build(&buffer, metrics());
        gutter.render(&viewport(0.0), &layout, &buffer, 0, &mut measurer);

        buffer.insert(1, "\nnew").unwrap();
        let layout = MonospaceLayout::build(&buffer, metrics());
        let commands = gutter.render(&viewport(0.0), &layout, &buffer, 0, &mut measurer);
        assert_eq!(labels(&commands).len(), 3);
    }
}
