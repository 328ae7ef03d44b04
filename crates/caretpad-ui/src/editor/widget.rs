//! The editor widget: gutter, text, current-line band, selection and caret
//! painted with an `egui::Painter` from one [`EditorSession`].

use std::time::Instant;

use egui::{
    text::LayoutJob, Align2, FontId, Mesh, Pos2, Rect, Response, Sense, Shape, TextFormat, Ui,
    Vec2,
};

use super::caret::CaretPaint;
use super::gutter::{paint_gutter, UiMeasurer};
use super::layout::LayoutMetrics;
use super::theme::EditorTheme;
use crate::session::{EditorSession, FrameRequest, SessionEvent};

/// Row height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.4;

/// Renders one session and feeds it input for this frame.
pub struct EditorWidget<'a> {
    pub(crate) session: &'a mut EditorSession,
    theme: &'a EditorTheme,
    word_wrap: bool,
    /// Rows per page for PageUp/PageDown, from the last layout pass.
    pub(crate) page_rows: isize,
}

impl<'a> EditorWidget<'a> {
    pub fn new(session: &'a mut EditorSession, theme: &'a EditorTheme, word_wrap: bool) -> Self {
        Self {
            session,
            theme,
            word_wrap,
            page_rows: 1,
        }
    }

    /// Shows the editor, filling the available space.
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let fired = self.session.advance(Instant::now());
        if !fired.is_empty() {
            tracing::trace!(?fired, "coalesced redraw");
        }

        let theme = self.theme;
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::click_and_drag());
        let rect = response.rect;
        let gutter_width = theme.gutter.width.min(rect.width());
        let gutter_rect = Rect::from_min_size(rect.min, Vec2::new(gutter_width, rect.height()));
        let text_rect = Rect::from_min_max(Pos2::new(gutter_rect.max.x, rect.min.y), rect.max);
        painter.rect_filled(text_rect, 0.0, theme.bg_color);

        let font_id = FontId::monospace(self.session.font_size());
        let line_height = self.session.font_size() * LINE_HEIGHT_FACTOR;
        let char_width = measure_char_width(ui, &font_id);
        let container_width = text_rect.width().max(char_width);
        let metrics = LayoutMetrics {
            char_width,
            line_height,
            container_width,
            inset: Vec2::new(0.0, theme.text_inset_y),
            wrap_column: self
                .word_wrap
                .then(|| LayoutMetrics::wrap_column_for(container_width, char_width)),
        };
        self.page_rows = ((text_rect.height() / line_height).floor() as isize).max(1);

        // Auto-focus so the editor is ready for typing.
        if !response.has_focus() && !response.lost_focus() {
            response.request_focus();
        }
        let has_focus = response.has_focus();
        if has_focus != self.session.is_focused() {
            self.session.handle(SessionEvent::FocusChanged(has_focus));
        }

        let caret_before = self.session.caret_offset();
        self.handle_pointer(ui, &response, text_rect);
        if has_focus {
            ui.memory_mut(|mem| {
                mem.set_focus_lock_filter(
                    response.id,
                    egui::EventFilter {
                        tab: true,
                        horizontal_arrows: true,
                        vertical_arrows: true,
                        escape: false,
                    },
                );
            });
            self.handle_keyboard_input(ui);
        }

        if response.hovered() {
            let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll_delta != 0.0 {
                let max = self.session.content_height() - text_rect.height();
                let target = self.session.scroll_y() - scroll_delta;
                self.session.scroll_to(target, max);
            }
        }

        let visible = Rect::from_min_size(Pos2::new(0.0, self.session.scroll_y()), text_rect.size());
        let request = FrameRequest {
            metrics,
            visible,
            gutter_bounds: gutter_rect,
        };
        let paint = self.session.frame(&request, &mut UiMeasurer::new(ui));

        // View coordinates -> screen.
        let offset = text_rect.min.to_vec2() - visible.min.to_vec2();
        let text_painter = painter.with_clip_rect(text_rect);
        if let Some(band) = paint.line_band {
            text_painter.rect_filled(band.translate(offset), 0.0, theme.current_line_highlight);
        }
        for selection in &paint.selection {
            text_painter.rect_filled(selection.translate(offset), 0.0, theme.selection_color);
        }
        for (text, pos) in &paint.rows {
            text_painter.text(
                *pos + offset,
                Align2::LEFT_TOP,
                text,
                font_id.clone(),
                theme.text_color,
            );
        }
        if let Some(caret) = paint.caret {
            paint_caret(&text_painter, caret, offset);
        }
        paint_gutter(
            &painter.with_clip_rect(gutter_rect),
            &paint.gutter,
            &FontId::monospace(self.session.gutter().style().font_size),
        );

        if self.session.caret_offset() != caret_before {
            self.session.scroll_caret_into_view(text_rect.height());
        }

        let damage = self.session.take_damage();
        if !damage.is_none() {
            tracing::trace!(?damage, "view damage painted");
        }
        if let Some(wait) = self.session.time_until_next_timer() {
            ui.ctx().request_repaint_after(wait);
        }

        response
    }

    fn handle_pointer(&mut self, ui: &Ui, response: &Response, text_rect: Rect) {
        let scroll_y = self.session.scroll_y();
        let to_view = move |pos: Pos2| pos - text_rect.min.to_vec2() + Vec2::new(0.0, scroll_y);

        if response.clicked() || response.drag_started() {
            response.request_focus();
            if let Some(pos) = response.interact_pointer_pos() {
                if text_rect.contains(pos) {
                    let extend = ui.input(|i| i.modifiers.shift);
                    if let Some(offset) = self.session.offset_at(to_view(pos)) {
                        self.session.move_caret(offset, extend);
                    }
                }
            }
        } else if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(offset) = self.session.offset_at(to_view(pos)) {
                    self.session.move_caret(offset, true);
                }
            }
        }
    }
}

/// Fills the caret with a plain mesh, which egui doesn't feather.
fn paint_caret(painter: &egui::Painter, caret: CaretPaint, offset: Vec2) {
    let rect = caret.rect.translate(offset);
    if caret.antialias {
        painter.rect_filled(rect, 0.0, caret.color);
    } else {
        let mut mesh = Mesh::default();
        mesh.add_colored_rect(rect, caret.color);
        painter.add(Shape::mesh(mesh));
    }
}

/// Measures the width of a single monospace character.
fn measure_char_width(ui: &Ui, font_id: &FontId) -> f32 {
    let mut job = LayoutJob::default();
    job.append(
        "M",
        0.0,
        TextFormat {
            font_id: font_id.clone(),
            ..Default::default()
        },
    );
    let galley = ui.fonts_mut(|f| f.layout_job(job));
    galley.rect.width()
}
