//! Keyboard input handling for the editor widget.
//!
//! Maps egui key and text events onto session editing operations.

use egui::{Key, Modifiers, Ui};

use super::widget::EditorWidget;

/// Inserted for Tab; one glyph per char keeps columns aligned.
const TAB_TEXT: &str = "    ";

impl EditorWidget<'_> {
    /// Handles all keyboard input for the editor widget.
    pub(crate) fn handle_keyboard_input(&mut self, ui: &mut Ui) {
        let events: Vec<egui::Event> = ui.input(|i| i.events.clone());

        for event in &events {
            match event {
                egui::Event::Text(text) => {
                    // Ctrl/Alt combos are shortcuts, not text.
                    if !ui.input(|i| i.modifiers.ctrl || i.modifiers.command || i.modifiers.alt) {
                        self.session.insert_text(text);
                    }
                }
                egui::Event::Paste(text) => self.session.insert_text(text),
                egui::Event::Copy => {
                    if let Some(text) = self.session.selected_text() {
                        ui.ctx().copy_text(text);
                    }
                }
                egui::Event::Cut => {
                    if let Some(text) = self.session.selected_text() {
                        ui.ctx().copy_text(text);
                        self.session.delete_backward();
                    }
                }
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => self.handle_key(*key, *modifiers),
                _ => {}
            }
        }
    }

    /// Handles a single key press.
    fn handle_key(&mut self, key: Key, modifiers: Modifiers) {
        let shift = modifiers.shift;
        let ctrl = modifiers.ctrl || modifiers.command;
        let session = &mut *self.session;

        match key {
            Key::Backspace => session.delete_backward(),
            Key::Delete => session.delete_forward(),
            Key::Enter => session.insert_text("\n"),
            Key::Tab if !ctrl => session.insert_text(TAB_TEXT),
            Key::A if ctrl => session.select_all(),
            Key::Z if ctrl && shift => {
                session.redo();
            }
            Key::Z if ctrl => {
                session.undo();
            }
            Key::Y if ctrl => {
                session.redo();
            }
            Key::ArrowLeft => {
                let selection = session.selection();
                if !shift && !selection.is_empty() {
                    session.move_caret(selection.start, false);
                } else {
                    session.move_caret(session.caret_offset().saturating_sub(1), shift);
                }
            }
            Key::ArrowRight => {
                let selection = session.selection();
                if !shift && !selection.is_empty() {
                    session.move_caret(selection.end, false);
                } else {
                    let len = session.buffer().len_chars();
                    session.move_caret((session.caret_offset() + 1).min(len), shift);
                }
            }
            Key::ArrowUp => session.move_vertical(-1, shift),
            Key::ArrowDown => session.move_vertical(1, shift),
            Key::PageUp => session.move_vertical(-self.page_rows, shift),
            Key::PageDown => session.move_vertical(self.page_rows, shift),
            Key::Home if ctrl => session.move_caret(0, shift),
            Key::End if ctrl => {
                let len = session.buffer().len_chars();
                session.move_caret(len, shift);
            }
            Key::Home => session.move_line_start(shift),
            Key::End => session.move_line_end(shift),
            _ => {}
        }
    }
}
