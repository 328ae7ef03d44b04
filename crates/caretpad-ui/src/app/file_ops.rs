//! Open, Save and Save As through native file dialogs.

use super::App;

impl App {
    /// Asks for a file and opens it in a new tab.
    pub(crate) fn open_file_dialog(&mut self) {
        let dialog = rfd::FileDialog::new().set_title("Open File");
        if let Some(path) = dialog.pick_file() {
            if let Err(e) = self.tabs.open_file(&path) {
                tracing::error!("Failed to open file: {e:#}");
            }
        }
    }

    /// Saves the active tab to its file, or asks for a name if it has none.
    pub(crate) fn save_active(&mut self) {
        match self.tabs.save_active() {
            Ok(true) => {}
            Ok(false) => self.save_as_dialog(),
            Err(e) => tracing::error!("Failed to save: {e:#}"),
        }
    }

    /// Asks for a file name and saves the active tab there.
    pub(crate) fn save_as_dialog(&mut self) {
        let title = self.tabs.active_session().title.clone();
        let mut dialog = rfd::FileDialog::new()
            .set_title("Save As")
            .set_file_name(&title);
        if let Some(dir) = self.tabs.active_session().file_path().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.save_file() {
            if let Err(e) = self.tabs.save_active_as(path) {
                tracing::error!("Failed to save: {e:#}");
            }
        }
    }
}
