//! Tab manager for the open editor sessions.
//!
//! The tab list is persisted to `sessions.json` in the autosave directory
//! whenever tabs are added, closed, switched or saved under a new name.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use caretpad_config::{PersistedTab, WorkspaceState};

use crate::session::{file_title, EditorSession, SessionEvent, SessionOptions};

/// Manages open editor tabs. There is always at least one.
#[derive(Debug)]
pub struct TabManager {
    /// All open sessions.
    pub sessions: Vec<EditorSession>,
    /// Index of the active session.
    pub active: usize,
    /// Where each session writes its autosave file.
    autosave_dir: PathBuf,
    options: SessionOptions,
}

impl TabManager {
    /// Creates a tab manager with one empty session.
    pub fn new(autosave_dir: impl Into<PathBuf>, options: SessionOptions) -> Self {
        let mut tabs = Self {
            sessions: Vec::new(),
            active: 0,
            autosave_dir: autosave_dir.into(),
            options,
        };
        let first = tabs.create_session(tabs.next_untitled_title());
        tabs.sessions.push(first);
        tabs
    }

    /// Reopens the tabs listed in `<autosave_dir>/sessions.json`, falling back
    /// to one empty tab when there is nothing to restore.
    pub fn restore(autosave_dir: impl Into<PathBuf>, options: SessionOptions) -> Self {
        let autosave_dir = autosave_dir.into();
        let state_path = WorkspaceState::path_in(&autosave_dir);
        let state = match WorkspaceState::load(&state_path) {
            Ok(Some(state)) if !state.tabs.is_empty() => state,
            Ok(_) => return Self::new(autosave_dir, options),
            Err(e) => {
                tracing::warn!("Failed to restore tabs: {e:#}");
                return Self::new(autosave_dir, options);
            }
        };

        let now = Instant::now();
        let sessions: Vec<EditorSession> = state
            .tabs
            .iter()
            .map(|tab| {
                EditorSession::restore(
                    tab.title.clone(),
                    autosave_dir.join(&tab.autosave_file_name),
                    tab.file_path.clone(),
                    &options,
                    now,
                )
            })
            .collect();
        tracing::info!(tabs = sessions.len(), selected = state.selected_index, "restored tabs");
        Self {
            active: state.selected_index.min(sessions.len() - 1),
            sessions,
            autosave_dir,
            options,
        }
    }

    /// Snapshot of the tab list for `sessions.json`.
    pub fn workspace_state(&self) -> WorkspaceState {
        WorkspaceState {
            tabs: self
                .sessions
                .iter()
                .map(|s| PersistedTab {
                    autosave_file_name: s.autosave_file_name(),
                    file_path: s.file_path().map(Path::to_path_buf),
                    title: s.title.clone(),
                })
                .collect(),
            selected_index: self.active,
        }
    }

    /// Writes [`TabManager::workspace_state`]; failures are logged.
    pub fn persist(&self) {
        let path = WorkspaceState::path_in(&self.autosave_dir);
        if let Err(e) = self.workspace_state().save(&path) {
            tracing::warn!("Failed to save tab list: {e:#}");
        }
    }

    pub fn autosave_dir(&self) -> &Path {
        &self.autosave_dir
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Returns the active session.
    pub fn active_session(&self) -> &EditorSession {
        &self.sessions[self.active]
    }

    /// Returns the active session mutably.
    pub fn active_session_mut(&mut self) -> &mut EditorSession {
        &mut self.sessions[self.active]
    }

    fn create_session(&self, title: String) -> EditorSession {
        EditorSession::new(title, &self.autosave_dir, &self.options, Instant::now())
    }

    /// Adds a new empty tab and switches to it.
    pub fn new_tab(&mut self) {
        let session = self.create_session(self.next_untitled_title());
        self.push_and_activate(session);
        self.persist();
    }

    /// Returns the next available "Untitled" title.
    ///
    /// Numbers always increase: "Untitled", "Untitled 2", "Untitled 3"; closing
    /// an earlier tab does not free its number.
    pub fn next_untitled_title(&self) -> String {
        let max_n = self
            .sessions
            .iter()
            .map(|s| Self::parse_untitled_number(&s.title))
            .max()
            .unwrap_or(0);
        match max_n + 1 {
            1 => "Untitled".to_string(),
            n => format!("Untitled {n}"),
        }
    }

    /// "Untitled" → 1, "Untitled 3" → 3, anything else → 0.
    fn parse_untitled_number(title: &str) -> usize {
        if title == "Untitled" {
            1
        } else if let Some(suffix) = title.strip_prefix("Untitled ") {
            suffix.parse::<usize>().unwrap_or(0)
        } else {
            0
        }
    }

    /// Opens `path` in a new tab. A pristine single untitled tab is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read as UTF-8 text.
    pub fn open_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;

        let mut session = self.create_session(file_title(path));
        session.replace_all(&text);
        session.attach_file(path.to_path_buf());
        tracing::info!(path = %path.display(), chars = session.buffer().len_chars(), "opened file");

        let replace_pristine = self.sessions.len() == 1
            && self.sessions[0].buffer().is_empty()
            && !self.sessions[0].is_dirty();
        if replace_pristine {
            let mut old = std::mem::replace(&mut self.sessions[0], session);
            old.discard();
            self.active = 0;
        } else {
            self.push_and_activate(session);
        }
        self.persist();
        Ok(())
    }

    /// Saves the active tab to its file. Returns `Ok(false)` when the tab has
    /// no file yet and needs a name first.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_active(&mut self) -> anyhow::Result<bool> {
        let session = self.active_session_mut();
        if session.file_path().is_none() {
            return Ok(false);
        }
        session.save_to_file()?;
        Ok(true)
    }

    /// Saves the active tab to `path` and attaches it there.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_active_as(&mut self, path: PathBuf) -> anyhow::Result<()> {
        self.active_session_mut().save_as(path)?;
        self.persist();
        Ok(())
    }

    fn push_and_activate(&mut self, session: EditorSession) {
        self.blur_active();
        self.sessions.push(session);
        self.active = self.sessions.len() - 1;
    }

    /// Closes a tab by index and deletes its autosave draft. Returns true if
    /// closed.
    ///
    /// Closing the last tab leaves a fresh empty one.
    pub fn close_tab(&mut self, idx: usize) -> bool {
        if idx >= self.sessions.len() {
            return false;
        }

        if self.sessions.len() == 1 {
            let fresh = self.create_session("Untitled".to_string());
            let mut old = std::mem::replace(&mut self.sessions[0], fresh);
            old.discard();
            self.active = 0;
        } else {
            let mut closed = self.sessions.remove(idx);
            closed.discard();
            if self.active >= self.sessions.len() {
                self.active = self.sessions.len() - 1;
            } else if self.active > idx {
                self.active -= 1;
            }
        }
        self.persist();
        true
    }

    /// Switches to a specific tab; the previous one loses focus.
    pub fn switch_to(&mut self, idx: usize) {
        if idx < self.sessions.len() && idx != self.active {
            self.blur_active();
            self.active = idx;
            self.persist();
        }
    }

    /// Activates the tab to the right, wrapping around.
    pub fn next_tab(&mut self) {
        self.switch_to((self.active + 1) % self.sessions.len());
    }

    /// Activates the tab to the left, wrapping around.
    pub fn previous_tab(&mut self) {
        let count = self.sessions.len();
        self.switch_to((self.active + count - 1) % count);
    }

    /// Returns the number of open tabs.
    pub fn tab_count(&self) -> usize {
        self.sessions.len()
    }

    /// Sends `event` to every session.
    pub fn broadcast(&mut self, event: SessionEvent) {
        for session in &mut self.sessions {
            session.handle(event);
        }
    }

    /// Saves the tab list and closes every session, flushing autosave. Used
    /// on exit.
    pub fn close_all(&mut self) {
        self.persist();
        for session in &mut self.sessions {
            session.close();
        }
    }

    fn blur_active(&mut self) {
        if let Some(session) = self.sessions.get_mut(self.active) {
            if session.is_focused() {
                session.handle(SessionEvent::FocusChanged(false));
            }
        }
    }
}
