//! Debounced autosave of a session's text to a per-tab file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::buffer::TextBuffer;
use crate::timer::{Scheduler, TimerId};

/// Quiet period after the last edit before the text is written.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(800);

/// Writes the session text to `path` once edits settle.
#[derive(Debug, Clone)]
pub struct Autosave {
    path: PathBuf,
    delay: Duration,
    saved_version: Option<u64>,
}

impl Autosave {
    pub fn new(path: impl Into<PathBuf>, delay: Duration) -> Self {
        Self {
            path: path.into(),
            delay,
            saved_version: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restarts the quiet period; called on every text change.
    pub fn touch(&self, scheduler: &mut impl Scheduler) {
        scheduler.schedule(TimerId::Autosave, self.delay);
    }

    pub fn cancel(&self, scheduler: &mut impl Scheduler) {
        scheduler.cancel(TimerId::Autosave);
    }

    /// True when `text` has changed since the last successful save.
    pub fn is_dirty(&self, text: &TextBuffer) -> bool {
        self.saved_version != Some(text.version())
    }

    /// Writes `text` atomically: a sibling temp file is renamed over the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the write fails.
    pub fn save(&mut self, text: &TextBuffer) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating autosave directory {}", dir.display()))?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, text.to_string())
            .with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        self.saved_version = Some(text.version());
        tracing::debug!(path = %self.path.display(), version = text.version(), "autosaved");
        Ok(())
    }

    /// Cancels any pending save and writes immediately if there is unsaved text.
    ///
    /// # Errors
    ///
    /// Propagates the write error from [`Autosave::save`].
    pub fn flush(&mut self, text: &TextBuffer, scheduler: &mut impl Scheduler) -> Result<()> {
        self.cancel(scheduler);
        if self.is_dirty(text) {
            self.save(text)?;
        }
        Ok(())
    }

    /// Marks `text` as already persisted (e.g. just restored from this file).
    pub fn mark_saved(&mut self, text: &TextBuffer) {
        self.saved_version = Some(text.version());
    }
}
