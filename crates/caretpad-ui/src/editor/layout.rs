//! Text layout capability and the fixed-pitch layout the editor widget uses.
//!
//! Rectangles returned by [`TextLayout`] are in container coordinates: the
//! origin is the top-left of the text container, before the container inset
//! is applied. Callers add [`TextLayout::container_inset`] to get view
//! coordinates.

use std::ops::Range;

use caretpad_core::TextBuffer;
use egui::{Pos2, Rect, Vec2};

/// What the gutter and caret need from a layout engine.
pub trait TextLayout {
    /// Glyphs whose line fragments intersect `rect` (container coordinates).
    fn glyph_range_for_rect(&self, rect: Rect) -> Range<usize>;

    fn char_index_for_glyph(&self, glyph: usize) -> usize;

    fn glyph_range_for_chars(&self, chars: Range<usize>) -> Range<usize>;

    /// Fragment containing `glyph`, or `None` if it isn't laid out.
    fn line_fragment_rect(&self, glyph: usize) -> Option<Rect>;

    /// The empty fragment after a trailing newline (or for empty text).
    fn extra_line_fragment_rect(&self) -> Option<Rect>;

    fn container_inset(&self) -> Vec2;

    /// Default thin caret rect for an insertion point at `char_index`.
    fn insertion_point_rect(&self, char_index: usize) -> Option<Rect>;
}

/// Font and container measurements a [`MonospaceLayout`] is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub char_width: f32,
    pub line_height: f32,
    pub container_width: f32,
    pub inset: Vec2,
    /// Soft-wrap column; `None` disables wrapping.
    pub wrap_column: Option<usize>,
}

impl LayoutMetrics {
    /// Wrap column that fits `container_width`, at least one char.
    pub fn wrap_column_for(container_width: f32, char_width: f32) -> usize {
        if char_width <= 0.0 {
            return 1;
        }
        ((container_width / char_width).floor() as usize).max(1)
    }
}

/// One visual row of text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment {
    /// Glyphs on this row, including the terminating `'\n'` on a line's last row.
    glyphs: Range<usize>,
    row: usize,
    /// Last row of a `'\n'`-terminated line.
    newline: bool,
}

/// Layout for a fixed-pitch font: one glyph per char, soft wrap at a column.
#[derive(Debug, Clone)]
pub struct MonospaceLayout {
    metrics: LayoutMetrics,
    fragments: Vec<Fragment>,
    glyph_count: usize,
    extra_row: Option<usize>,
}

impl MonospaceLayout {
    /// Lays out the whole buffer. Only `'\n'` breaks lines.
    pub fn build(text: &TextBuffer, metrics: LayoutMetrics) -> Self {
        let wrap_at = metrics.wrap_column.unwrap_or(usize::MAX).max(1);
        let len = text.len_chars();
        let mut fragments = Vec::new();
        let mut row = 0usize;

        let mut push_line = |start: usize, end: usize, has_newline: bool| {
            let content = end - start - usize::from(has_newline);
            let rows = if content == 0 {
                1
            } else {
                content.div_ceil(wrap_at)
            };
            for r in 0..rows {
                let seg_start = start + r * wrap_at;
                let seg_end = if r + 1 == rows { end } else { seg_start + wrap_at };
                fragments.push(Fragment {
                    glyphs: seg_start..seg_end,
                    row,
                    newline: has_newline && r + 1 == rows,
                });
                row += 1;
            }
        };

        let mut line_start = 0;
        for (idx, ch) in text.chars_at(0).enumerate() {
            if ch == '\n' {
                push_line(line_start, idx + 1, true);
                line_start = idx + 1;
            }
        }
        if line_start < len {
            push_line(line_start, len, false);
        }

        let extra_row = (len == 0 || text.ends_with_newline()).then_some(row);
        tracing::trace!(rows = row, len, "built monospace layout");

        Self {
            metrics,
            fragments,
            glyph_count: len,
            extra_row,
        }
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    /// Visual rows, counting the extra row.
    pub fn row_count(&self) -> usize {
        self.fragments.len() + usize::from(self.extra_row.is_some())
    }

    /// Height of the laid-out text plus the top and bottom inset.
    pub fn content_height(&self) -> f32 {
        self.row_count() as f32 * self.metrics.line_height + 2.0 * self.metrics.inset.y
    }

    /// Rows intersecting `rect` (container coordinates) as `(chars, rect)` pairs.
    pub fn visible_rows(&self, rect: Rect) -> impl Iterator<Item = (Range<usize>, Rect)> + '_ {
        let (first, last) = self.fragment_span(rect);
        self.fragments[first..last]
            .iter()
            .map(|f| (f.glyphs.clone(), self.row_rect(f.row)))
    }

    /// Highlight rects for `selection` on rows intersecting `visible`.
    pub fn selection_rects(&self, selection: Range<usize>, visible: Rect) -> Vec<Rect> {
        if selection.is_empty() {
            return Vec::new();
        }
        let (first, last) = self.fragment_span(visible);
        self.fragments[first..last]
            .iter()
            .filter_map(|f| {
                let start = selection.start.max(f.glyphs.start);
                let end = selection.end.min(f.glyphs.end);
                if start >= end {
                    return None;
                }
                let row = self.row_rect(f.row);
                let x0 = (start - f.glyphs.start) as f32 * self.metrics.char_width;
                let x1 = (end - f.glyphs.start) as f32 * self.metrics.char_width;
                Some(Rect::from_min_max(
                    Pos2::new(x0, row.min.y),
                    Pos2::new(x1, row.max.y),
                ))
            })
            .collect()
    }

    /// Char offset closest to `pos` (container coordinates).
    pub fn char_index_at(&self, pos: Pos2) -> usize {
        let row = if pos.y <= 0.0 {
            0
        } else {
            (pos.y / self.metrics.line_height) as usize
        };
        // Rows are numbered in fragment order.
        let Some(fragment) = self.fragments.get(row) else {
            return if row == 0 { 0 } else { self.glyph_count };
        };
        let col = if pos.x <= 0.0 || self.metrics.char_width <= 0.0 {
            0
        } else {
            (pos.x / self.metrics.char_width).round() as usize
        };
        // The row's trailing newline (or wrap boundary) isn't a caret stop.
        let last_stop = if fragment.newline || fragment.glyphs.end < self.glyph_count {
            fragment.glyphs.end - 1
        } else {
            fragment.glyphs.end
        };
        (fragment.glyphs.start + col).min(last_stop)
    }

    /// Offset on the row above or below `offset`, keeping the column.
    pub fn vertical_neighbor(&self, offset: usize, rows_down: isize) -> usize {
        let Some(caret) = self.insertion_point_rect(offset) else {
            return offset;
        };
        let target_y = caret.center().y + rows_down as f32 * self.metrics.line_height;
        if target_y < 0.0 {
            return 0;
        }
        if target_y >= self.row_count() as f32 * self.metrics.line_height {
            return self.glyph_count;
        }
        self.char_index_at(Pos2::new(caret.min.x, target_y))
    }

    fn fragment_span(&self, rect: Rect) -> (usize, usize) {
        let lh = self.metrics.line_height;
        let first = self
            .fragments
            .partition_point(|f| (f.row + 1) as f32 * lh <= rect.min.y);
        let last = self
            .fragments
            .partition_point(|f| (f.row as f32 * lh) < rect.max.y);
        (first, last.max(first))
    }

    fn row_rect(&self, row: usize) -> Rect {
        Rect::from_min_size(
            Pos2::new(0.0, row as f32 * self.metrics.line_height),
            Vec2::new(self.metrics.container_width, self.metrics.line_height),
        )
    }

    fn fragment_index_for_glyph(&self, glyph: usize) -> Option<usize> {
        let idx = self.fragments.partition_point(|f| f.glyphs.end <= glyph);
        self.fragments
            .get(idx)
            .filter(|f| f.glyphs.contains(&glyph))
            .map(|_| idx)
    }
}

impl TextLayout for MonospaceLayout {
    fn glyph_range_for_rect(&self, rect: Rect) -> Range<usize> {
        let (first, last) = self.fragment_span(rect);
        if first == last {
            return 0..0;
        }
        self.fragments[first].glyphs.start..self.fragments[last - 1].glyphs.end
    }

    fn char_index_for_glyph(&self, glyph: usize) -> usize {
        glyph
    }

    fn glyph_range_for_chars(&self, chars: Range<usize>) -> Range<usize> {
        chars.start.min(self.glyph_count)..chars.end.min(self.glyph_count)
    }

    fn line_fragment_rect(&self, glyph: usize) -> Option<Rect> {
        let idx = self.fragment_index_for_glyph(glyph)?;
        Some(self.row_rect(self.fragments[idx].row))
    }

    fn extra_line_fragment_rect(&self) -> Option<Rect> {
        self.extra_row.map(|row| self.row_rect(row))
    }

    fn container_inset(&self) -> Vec2 {
        self.metrics.inset
    }

    fn insertion_point_rect(&self, char_index: usize) -> Option<Rect> {
        let (row, col) = match self.fragment_index_for_glyph(char_index) {
            Some(idx) => {
                let f = &self.fragments[idx];
                (f.row, char_index - f.glyphs.start)
            }
            None if char_index == self.glyph_count => match (self.extra_row, self.fragments.last()) {
                (Some(row), _) => (row, 0),
                (None, Some(last)) => (last.row, last.glyphs.len()),
                (None, None) => return None,
            },
            None => return None,
        };
        let row_rect = self.row_rect(row);
        let x = col as f32 * self.metrics.char_width;
        Some(Rect::from_min_size(
            Pos2::new(x, row_rect.min.y),
            Vec2::new(1.0, self.metrics.line_height),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(wrap: Option<usize>) -> LayoutMetrics {
        LayoutMetrics {
            char_width: 8.0,
            line_height: 20.0,
            container_width: 400.0,
            inset: Vec2::new(0.0, 10.0),
            wrap_column: wrap,
        }
    }

    fn layout(text: &str, wrap: Option<usize>) -> MonospaceLayout {
        MonospaceLayout::build(&TextBuffer::from(text), metrics(wrap))
    }

    #[test]
    fn empty_text_has_only_extra_fragment() {
        let l = layout("", None);
        assert_eq!(l.glyph_range_for_rect(Rect::EVERYTHING), 0..0);
        assert_eq!(l.line_fragment_rect(0), None);
        let extra = l.extra_line_fragment_rect().unwrap();
        assert_eq!(extra.min.y, 0.0);
        assert_eq!(l.row_count(), 1);
    }

    #[test]
    fn trailing_newline_adds_extra_fragment() {
        let l = layout("x\n", None);
        assert_eq!(l.glyph_range_for_rect(Rect::EVERYTHING), 0..2);
        assert_eq!(l.line_fragment_rect(1).unwrap().min.y, 0.0);
        assert_eq!(l.extra_line_fragment_rect().unwrap().min.y, 20.0);

        assert!(layout("x", None).extra_line_fragment_rect().is_none());
    }

    #[test]
    fn wrapping_splits_rows() {
        // "abcdefg" at 3 columns: abc | def | g
        let l = layout("abcdefg\nz", Some(3));
        assert_eq!(l.line_fragment_rect(2).unwrap().min.y, 0.0);
        assert_eq!(l.line_fragment_rect(3).unwrap().min.y, 20.0);
        assert_eq!(l.line_fragment_rect(7).unwrap().min.y, 40.0);
        assert_eq!(l.line_fragment_rect(8).unwrap().min.y, 60.0);
        assert_eq!(l.row_count(), 4);
    }

    #[test]
    fn rect_query_returns_intersecting_rows() {
        let l = layout("a\nbb\nccc\ndddd", None);
        // Rows 1 and 2 (y 20..60)
        let range = l.glyph_range_for_rect(Rect::from_min_max(
            Pos2::new(0.0, 25.0),
            Pos2::new(100.0, 45.0),
        ));
        assert_eq!(range, 2..9);
        let below = l.glyph_range_for_rect(Rect::from_min_max(
            Pos2::new(0.0, 500.0),
            Pos2::new(100.0, 600.0),
        ));
        assert!(below.is_empty());
    }

    #[test]
    fn insertion_point_positions() {
        let l = layout("ab\ncd", None);
        let at_b = l.insertion_point_rect(1).unwrap();
        assert_eq!(at_b.min, Pos2::new(8.0, 0.0));
        let end = l.insertion_point_rect(5).unwrap();
        assert_eq!(end.min, Pos2::new(16.0, 20.0));
        assert_eq!(l.insertion_point_rect(9), None);

        let trailing = layout("ab\n", None).insertion_point_rect(3).unwrap();
        assert_eq!(trailing.min, Pos2::new(0.0, 20.0));
    }

    #[test]
    fn hit_testing_clamps_to_line_end() {
        let l = layout("ab\ncdef", None);
        assert_eq!(l.char_index_at(Pos2::new(100.0, 5.0)), 2);
        assert_eq!(l.char_index_at(Pos2::new(9.0, 25.0)), 4);
        assert_eq!(l.char_index_at(Pos2::new(100.0, 25.0)), 7);
        assert_eq!(l.char_index_at(Pos2::new(0.0, 500.0)), 7);
        assert_eq!(l.char_index_at(Pos2::new(-5.0, -5.0)), 0);
    }

    #[test]
    fn vertical_neighbor_keeps_column() {
        let l = layout("abcd\nxy\nlonger", None);
        assert_eq!(l.vertical_neighbor(3, 1), 7);
        assert_eq!(l.vertical_neighbor(7, 1), 10);
        assert_eq!(l.vertical_neighbor(1, -1), 0);
        assert_eq!(l.vertical_neighbor(10, 5), 14);
    }

    #[test]
    fn selection_rects_cover_each_row() {
        let l = layout("abc\ndef", None);
        let rects = l.selection_rects(1..6, Rect::EVERYTHING);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].min.x, 8.0);
        assert_eq!(rects[0].max.x, 32.0);
        assert_eq!(rects[1].max.x, 16.0);
        assert!(l.selection_rects(2..2, Rect::EVERYTHING).is_empty());
    }
}
