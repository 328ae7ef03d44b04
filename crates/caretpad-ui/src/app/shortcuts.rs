//! Global keyboard shortcuts: zoom, files and tab management.

use eframe::egui;

use super::App;

impl App {
    pub(crate) fn handle_global_shortcuts(&mut self, ctx: &egui::Context) {
        let (ctrl, shift, keys) = ctx.input(|i| {
            let ctrl = i.modifiers.ctrl || i.modifiers.command;
            let keys: Vec<egui::Key> = i
                .events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key {
                        key, pressed: true, ..
                    } => Some(*key),
                    _ => None,
                })
                .collect();
            (ctrl, i.modifiers.shift, keys)
        });
        if !ctrl {
            return;
        }

        for key in keys {
            match key {
                egui::Key::Plus | egui::Key::Equals => self.zoom_in(),
                egui::Key::Minus => self.zoom_out(),
                egui::Key::T => self.new_tab(),
                egui::Key::W => self.close_tab(self.tabs.active),
                egui::Key::O => self.open_file_dialog(),
                egui::Key::S if shift => self.save_as_dialog(),
                egui::Key::S => self.save_active(),
                egui::Key::Tab if shift => self.tabs.previous_tab(),
                egui::Key::Tab => self.tabs.next_tab(),
                egui::Key::CloseBracket | egui::Key::CloseCurlyBracket if shift => {
                    self.tabs.next_tab();
                }
                egui::Key::OpenBracket | egui::Key::OpenCurlyBracket if shift => {
                    self.tabs.previous_tab();
                }
                _ => {}
            }
        }
    }
}
