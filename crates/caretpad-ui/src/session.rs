//! One editor tab: text, selection, focus and the render state around them.
//!
//! Hosts talk to a session through typed [`SessionEvent`]s and the editing
//! helpers; deferred work (caret blink, coalesced redraws, autosave) runs from
//! [`EditorSession::advance`], which the frame loop calls with the current
//! time. [`EditorSession::close`] tears everything down.
//!
//! A session may also be backed by a file on disk; the autosave file is kept
//! either way so drafts survive a restart.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use caretpad_config::AppConfig;
use caretpad_core::{
    Autosave, EditOperation, RedrawCoalescer, RedrawFlags, TextBuffer, TimerId, TimerQueue,
    UndoHistory,
};
use egui::{Pos2, Rect, Vec2};
use uuid::Uuid;

use crate::editor::caret::{current_line_band, insertion_line_fragment, CaretController, CaretPaint};
use crate::editor::damage::Damage;
use crate::editor::gutter::{GutterPaint, GutterRenderer, GutterViewport, LabelMeasurer};
use crate::editor::layout::{LayoutMetrics, MonospaceLayout, TextLayout};
use crate::editor::layout_cache::LayoutCache;
use crate::editor::theme::{CaretStyle, EditorTheme, GutterStyle};

/// Notifications a session reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    TextChanged,
    SelectionChanged,
    Scrolled,
    FocusChanged(bool),
    /// New text font size in points.
    FontSizeChanged(f32),
}

/// Styles and timings a session is created with.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub font_size: f32,
    pub gutter: GutterStyle,
    pub caret: CaretStyle,
    pub redraw_interval: Duration,
    pub autosave_delay: Duration,
}

impl SessionOptions {
    pub fn new(theme: &EditorTheme, config: &AppConfig) -> Self {
        Self {
            font_size: theme.font_size,
            gutter: theme.gutter.clone(),
            caret: theme.caret,
            redraw_interval: config.redraw_interval(),
            autosave_delay: config.autosave_delay(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new(&EditorTheme::default(), &AppConfig::default())
    }
}

/// What the widget needs to know to lay out one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRequest {
    pub metrics: LayoutMetrics,
    /// Visible part of the text view, in view coordinates.
    pub visible: Rect,
    /// Gutter area on screen.
    pub gutter_bounds: Rect,
}

/// Everything to paint for one frame. Text-view rects are in view coordinates;
/// gutter commands are already on screen.
#[derive(Debug, Clone, Default)]
pub struct FramePaint {
    pub gutter: Vec<GutterPaint>,
    pub line_band: Option<Rect>,
    pub selection: Vec<Rect>,
    /// Row text (without the line break) and its top-left.
    pub rows: Vec<(String, Pos2)>,
    pub caret: Option<CaretPaint>,
    pub content_height: f32,
}

#[derive(Debug)]
pub struct EditorSession {
    id: Uuid,
    pub title: String,
    buffer: TextBuffer,
    file_path: Option<PathBuf>,
    /// Buffer version last written to `file_path`.
    file_version: Option<u64>,
    history: UndoHistory,
    anchor: usize,
    head: usize,
    focused: bool,
    closed: bool,
    font_size: f32,
    scroll_y: f32,
    gutter: GutterRenderer,
    caret: CaretController,
    redraw: RedrawCoalescer,
    autosave: Autosave,
    timers: TimerQueue,
    damage: Damage,
    layout: LayoutCache,
}

impl EditorSession {
    /// Creates an empty session autosaving to `<autosave_dir>/<id>.txt`.
    pub fn new(
        title: impl Into<String>,
        autosave_dir: &Path,
        options: &SessionOptions,
        now: Instant,
    ) -> Self {
        let id = Uuid::new_v4();
        let autosave_path = autosave_dir.join(format!("{id}.txt"));
        Self::build(id, title.into(), autosave_path, options, now)
    }

    /// Brings back a session from its autosave file. A missing file gives an
    /// empty session. `file_path` counts as saved only if its contents still
    /// match the draft.
    pub fn restore(
        title: impl Into<String>,
        autosave_path: PathBuf,
        file_path: Option<PathBuf>,
        options: &SessionOptions,
        now: Instant,
    ) -> Self {
        let mut session = Self::build(Uuid::new_v4(), title.into(), autosave_path, options, now);
        match std::fs::read_to_string(session.autosave.path()) {
            Ok(text) => session.buffer.replace_all(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to read autosave {}: {e}",
                session.autosave.path().display()
            ),
        }
        session.autosave.mark_saved(&session.buffer);
        if let Some(path) = file_path {
            let matches_disk = std::fs::read_to_string(&path)
                .is_ok_and(|on_disk| on_disk == session.buffer.to_string());
            if matches_disk {
                session.file_version = Some(session.buffer.version());
            }
            session.file_path = Some(path);
        }
        session
    }

    fn build(
        id: Uuid,
        title: String,
        autosave_path: PathBuf,
        options: &SessionOptions,
        now: Instant,
    ) -> Self {
        tracing::debug!(%id, path = %autosave_path.display(), "new editor session");
        let buffer = TextBuffer::new();
        let mut autosave = Autosave::new(autosave_path, options.autosave_delay);
        // Nothing typed yet, nothing to write.
        autosave.mark_saved(&buffer);
        Self {
            id,
            title,
            buffer,
            file_path: None,
            file_version: None,
            history: UndoHistory::default(),
            anchor: 0,
            head: 0,
            focused: false,
            closed: false,
            font_size: options.font_size,
            scroll_y: 0.0,
            gutter: GutterRenderer::new(options.gutter.clone()),
            caret: CaretController::new(options.caret),
            redraw: RedrawCoalescer::new(options.redraw_interval),
            autosave,
            timers: TimerQueue::new(now),
            damage: Damage::default(),
            layout: LayoutCache::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Selected char range, ordered.
    pub fn selection(&self) -> Range<usize> {
        self.anchor.min(self.head)..self.anchor.max(self.head)
    }

    pub fn selection_len(&self) -> usize {
        self.selection().len()
    }

    /// Insertion point (the moving end of the selection).
    pub fn caret_offset(&self) -> usize {
        self.head
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn caret(&self) -> &CaretController {
        &self.caret
    }

    pub fn gutter(&self) -> &GutterRenderer {
        &self.gutter
    }

    pub fn autosave_path(&self) -> &Path {
        self.autosave.path()
    }

    /// File name of the autosave file, as stored in the workspace state.
    pub fn autosave_file_name(&self) -> String {
        self.autosave
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Text not yet written to the autosave file.
    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty(&self.buffer)
    }

    /// Unsaved changes: against the file for file-backed tabs, against the
    /// autosave draft otherwise.
    pub fn is_modified(&self) -> bool {
        match self.file_path {
            Some(_) => self.file_version != Some(self.buffer.version()),
            None => self.is_dirty(),
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn pending_redraw(&self) -> RedrawFlags {
        self.redraw.pending()
    }

    /// Accumulated view damage since the last call.
    pub fn take_damage(&mut self) -> Damage {
        self.damage.take()
    }

    /// Time until the next timer; the host should wake up by then.
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    pub fn handle(&mut self, event: SessionEvent) {
        if self.closed {
            tracing::trace!(id = %self.id, ?event, "event after close ignored");
            return;
        }
        match event {
            SessionEvent::TextChanged => {
                self.gutter.invalidate_caches();
                self.redraw.request(RedrawFlags::GUTTER, &mut self.timers);
                self.autosave.touch(&mut self.timers);
            }
            SessionEvent::SelectionChanged => {
                let selection_len = self.selection_len();
                self.caret.selection_changed(
                    self.focused,
                    selection_len,
                    &mut self.timers,
                    &mut self.damage,
                );
                self.redraw.request(RedrawFlags::ALL, &mut self.timers);
            }
            SessionEvent::Scrolled => {
                self.redraw.request(RedrawFlags::ALL, &mut self.timers);
            }
            SessionEvent::FocusChanged(focused) => {
                self.focused = focused;
                if focused {
                    let selection_len = self.selection_len();
                    self.caret
                        .focus_gained(selection_len, &mut self.timers, &mut self.damage);
                } else {
                    self.caret.focus_lost(&mut self.timers, &mut self.damage);
                }
                self.redraw.request(RedrawFlags::ALL, &mut self.timers);
            }
            SessionEvent::FontSizeChanged(size) => {
                self.font_size = size;
                self.gutter.set_font_size((size - 2.0).max(11.0));
                self.layout.invalidate();
                self.damage.invalidate_all();
                self.redraw.request(RedrawFlags::ALL, &mut self.timers);
            }
        }
    }

    /// Fires whatever came due by `now` and returns the redraw flags that fired.
    pub fn advance(&mut self, now: Instant) -> RedrawFlags {
        let mut flags = RedrawFlags::NONE;
        if self.closed {
            return flags;
        }
        let focused = self.focused;
        let selection_len = self.selection_len();
        for id in self.timers.advance_to(now) {
            match id {
                TimerId::CaretBlink => self.caret.blink_tick(
                    focused,
                    selection_len,
                    &mut self.timers,
                    &mut self.damage,
                ),
                TimerId::Redraw => flags = flags | self.redraw.fire(),
                TimerId::Autosave => self.save_autosave(),
            }
        }
        flags
    }

    /// Cancels every timer, flushes autosave and ignores later events.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.autosave.flush(&self.buffer, &mut self.timers) {
            tracing::warn!("Autosave on close failed for '{}': {e:#}", self.title);
        }
        self.shut_down();
    }

    /// Closes without flushing and deletes the autosave file. Used when the
    /// user closes the tab, so its draft is no longer part of the workspace.
    pub fn discard(&mut self) {
        if self.closed {
            return;
        }
        self.shut_down();
        match std::fs::remove_file(self.autosave.path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to remove autosave {}: {e}",
                self.autosave.path().display()
            ),
        }
    }

    fn shut_down(&mut self) {
        self.caret.focus_lost(&mut self.timers, &mut self.damage);
        self.redraw.cancel(&mut self.timers);
        self.timers.cancel_all();
        self.focused = false;
        self.closed = true;
        tracing::debug!(id = %self.id, "editor session closed");
    }

    // ── Files ───────────────────────────────────────────────────────

    /// Records `path` as the file holding the current text and retitles the tab.
    pub fn attach_file(&mut self, path: PathBuf) {
        self.title = file_title(&path);
        self.file_version = Some(self.buffer.version());
        self.file_path = Some(path);
    }

    /// Writes the text to the attached file.
    ///
    /// # Errors
    ///
    /// Returns an error if no file is attached or the write fails.
    pub fn save_to_file(&mut self) -> anyhow::Result<()> {
        let path = self
            .file_path
            .clone()
            .context("no file path set for this session")?;
        self.write_file(&path)?;
        self.file_version = Some(self.buffer.version());
        Ok(())
    }

    /// Writes the text to `path` and attaches the session to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; the session keeps its old file.
    pub fn save_as(&mut self, path: PathBuf) -> anyhow::Result<()> {
        self.write_file(&path)?;
        self.attach_file(path);
        Ok(())
    }

    fn write_file(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.buffer.to_string())
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), chars = self.buffer.len_chars(), "saved file");
        Ok(())
    }

    // ── Editing ─────────────────────────────────────────────────────

    /// Replaces the selection with `text` and puts the caret after it.
    pub fn insert_text(&mut self, text: &str) {
        if self.closed {
            return;
        }
        let range = self.selection();
        let deleted = self.text_in(range.clone());
        if let Err(e) = self.buffer.replace(range.start, range.end, text) {
            tracing::warn!("insert failed: {e:#}");
            return;
        }
        let caret = range.start + text.chars().count();
        self.record_edit(EditOperation {
            position: range.start,
            inserted: text.to_string(),
            deleted,
            caret_before: self.head,
            caret_after: caret,
        });
        self.anchor = caret;
        self.head = caret;
        self.handle(SessionEvent::TextChanged);
        self.handle(SessionEvent::SelectionChanged);
    }

    /// Deletes the selection, or the char before the caret.
    pub fn delete_backward(&mut self) {
        let range = self.selection();
        if range.is_empty() {
            if self.head == 0 {
                return;
            }
            self.delete_range(self.head - 1..self.head);
        } else {
            self.delete_range(range);
        }
    }

    /// Deletes the selection, or the char after the caret.
    pub fn delete_forward(&mut self) {
        let range = self.selection();
        if range.is_empty() {
            if self.head >= self.buffer.len_chars() {
                return;
            }
            self.delete_range(self.head..self.head + 1);
        } else {
            self.delete_range(range);
        }
    }

    fn delete_range(&mut self, range: Range<usize>) {
        if self.closed || range.is_empty() {
            return;
        }
        let deleted = self.text_in(range.clone());
        if let Err(e) = self.buffer.remove(range.start, range.end) {
            tracing::warn!("delete failed: {e:#}");
            return;
        }
        self.record_edit(EditOperation {
            position: range.start,
            inserted: String::new(),
            deleted,
            caret_before: self.head,
            caret_after: range.start,
        });
        self.anchor = range.start;
        self.head = range.start;
        self.handle(SessionEvent::TextChanged);
        self.handle(SessionEvent::SelectionChanged);
    }

    /// Sets the selection; offsets past the end are clamped.
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        if self.closed {
            return;
        }
        let len = self.buffer.len_chars();
        self.anchor = anchor.min(len);
        self.head = head.min(len);
        // Typing after a caret move is a new undo step.
        self.history.break_group();
        self.handle(SessionEvent::SelectionChanged);
    }

    /// Moves the caret to `offset`, extending the selection if asked.
    pub fn move_caret(&mut self, offset: usize, extend: bool) {
        let anchor = if extend { self.anchor } else { offset };
        self.set_selection(anchor, offset);
    }

    pub fn select_all(&mut self) {
        self.set_selection(0, self.buffer.len_chars());
    }

    /// Moves one visual row up (`rows < 0`) or down using the last layout.
    pub fn move_vertical(&mut self, rows: isize, extend: bool) {
        let Some(layout) = self.layout.current() else {
            return;
        };
        let target = layout.vertical_neighbor(self.head, rows);
        self.move_caret(target, extend);
    }

    /// Moves to the start of the caret's logical line.
    pub fn move_line_start(&mut self, extend: bool) {
        if let Some(range) = self.caret_line_range() {
            self.move_caret(range.start, extend);
        }
    }

    /// Moves to the end of the caret's logical line, before its line break.
    pub fn move_line_end(&mut self, extend: bool) {
        if let Some(range) = self.caret_line_range() {
            let ends_with_break = self.buffer.char_at(range.end.saturating_sub(1)) == Some('\n')
                && range.end > range.start;
            let end = if ends_with_break {
                range.end - 1
            } else {
                range.end
            };
            self.move_caret(end, extend);
        }
    }

    fn caret_line_range(&mut self) -> Option<Range<usize>> {
        let lines = self.gutter.lines_mut();
        let line = lines.line_number(&self.buffer, self.head);
        lines.line_range(&self.buffer, line)
    }

    pub fn selected_text(&self) -> Option<String> {
        let range = self.selection();
        if range.is_empty() {
            return None;
        }
        Some(self.text_in(range))
    }

    fn text_in(&self, range: Range<usize>) -> String {
        self.buffer
            .slice(range.start, range.end)
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    fn record_edit(&mut self, op: EditOperation) {
        let now = self.timers.now();
        self.history.record(op, now);
    }

    /// Reverts the latest undo group. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.closed {
            return false;
        }
        let Some(ops) = self.history.undo() else {
            return false;
        };
        let mut caret = self.head;
        for op in ops.iter().rev() {
            let inserted = op.inserted_range();
            if let Err(e) = self.buffer.replace(inserted.start, inserted.end, &op.deleted) {
                tracing::warn!("undo failed: {e:#}");
                break;
            }
            caret = op.caret_before;
        }
        self.finish_history_step(caret);
        true
    }

    /// Reapplies the latest undone group. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.closed {
            return false;
        }
        let Some(ops) = self.history.redo() else {
            return false;
        };
        let mut caret = self.head;
        for op in &ops {
            let deleted = op.deleted_range();
            if let Err(e) = self.buffer.replace(deleted.start, deleted.end, &op.inserted) {
                tracing::warn!("redo failed: {e:#}");
                break;
            }
            caret = op.caret_after;
        }
        self.finish_history_step(caret);
        true
    }

    fn finish_history_step(&mut self, caret: usize) {
        let caret = caret.min(self.buffer.len_chars());
        self.anchor = caret;
        self.head = caret;
        self.handle(SessionEvent::TextChanged);
        self.handle(SessionEvent::SelectionChanged);
    }

    /// Replaces the whole text (file load) and puts the caret at the start.
    pub fn replace_all(&mut self, text: &str) {
        if self.closed {
            return;
        }
        self.buffer.replace_all(text);
        self.history.clear();
        self.gutter.invalidate_caches();
        self.layout.invalidate();
        self.anchor = 0;
        self.head = 0;
        self.scroll_y = 0.0;
        self.handle(SessionEvent::TextChanged);
        self.handle(SessionEvent::SelectionChanged);
    }

    /// Sets the vertical scroll offset, clamped to `0..=max`.
    pub fn scroll_to(&mut self, y: f32, max: f32) {
        let y = y.clamp(0.0, max.max(0.0));
        if (y - self.scroll_y).abs() > f32::EPSILON {
            self.scroll_y = y;
            self.handle(SessionEvent::Scrolled);
        }
    }

    /// Scrolls just enough to show the caret in a view `height` pixels tall.
    pub fn scroll_caret_into_view(&mut self, height: f32) {
        let Some(layout) = self.layout.current() else {
            return;
        };
        let Some(rect) = layout.insertion_point_rect(self.head) else {
            return;
        };
        let inset = layout.container_inset().y;
        let max = (layout.content_height() - height).max(0.0);
        let top = rect.min.y + inset;
        let bottom = rect.max.y + inset;
        let target = if top < self.scroll_y {
            top - inset
        } else if bottom > self.scroll_y + height {
            bottom + inset - height
        } else {
            return;
        };
        self.scroll_to(target, max);
    }

    /// Height of the last laid-out text including insets.
    pub fn content_height(&self) -> f32 {
        self.layout.current().map_or(0.0, MonospaceLayout::content_height)
    }

    /// Char offset under a view-coordinate point, from the last frame's layout.
    pub fn offset_at(&self, view_pos: Pos2) -> Option<usize> {
        let layout = self.layout.current()?;
        Some(layout.char_index_at(view_pos - layout.container_inset()))
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Lays out the text (cached) and computes every paint for one frame.
    pub fn frame(
        &mut self,
        request: &FrameRequest,
        measurer: &mut impl LabelMeasurer,
    ) -> FramePaint {
        let selection = self.selection();
        let head = self.head;
        let focused = self.focused;
        let len = self.buffer.len_chars();

        let layout: &MonospaceLayout = self.layout.get_or_build(&self.buffer, request.metrics);
        let inset = layout.container_inset();
        let container_visible = request.visible.translate(-inset);

        let gutter = self.gutter.render(
            &GutterViewport {
                bounds: request.gutter_bounds,
                visible: request.visible,
            },
            layout,
            &self.buffer,
            selection.start,
            measurer,
        );

        let band_width = request.visible.max.x.max(request.metrics.container_width);
        let line_band = current_line_band(
            layout,
            &self.buffer,
            self.gutter.lines_mut(),
            selection.start,
            band_width,
        );

        let rows = layout
            .visible_rows(container_visible)
            .map(|(chars, rect)| {
                let text = self
                    .buffer
                    .slice(chars.start, chars.end)
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                let text = text.trim_end_matches(['\n', '\r']).to_string();
                (text, rect.min + inset)
            })
            .collect();

        let selection_rects = layout
            .selection_rects(selection.clone(), container_visible)
            .into_iter()
            .map(|r| r.translate(inset))
            .collect();

        // egui repaints whole frames, so the caret's dirty rect is everything.
        let caret = match layout.insertion_point_rect(head) {
            Some(default) => {
                let default = default.translate(Vec2::new(0.0, inset.y));
                let fragment = insertion_line_fragment(layout, len, head);
                self.caret.update_geometry(default, fragment, &mut self.damage);
                self.caret.paint(Rect::EVERYTHING, focused, selection.len())
            }
            None => None,
        };

        FramePaint {
            gutter,
            line_band,
            selection: selection_rects,
            rows,
            caret,
            content_height: layout.content_height(),
        }
    }

    fn save_autosave(&mut self) {
        if !self.autosave.is_dirty(&self.buffer) {
            return;
        }
        if let Err(e) = self.autosave.save(&self.buffer) {
            tracing::warn!("Autosave failed for '{}': {e:#}", self.title);
        }
    }
}

/// Tab title for a file: its name, or the whole path if it has none.
pub(crate) fn file_title(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
