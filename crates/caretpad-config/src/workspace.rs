//! The open-tab list saved next to the autosave files so a restart brings
//! every tab back.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name of the workspace state inside the autosave directory.
pub const WORKSPACE_FILE_NAME: &str = "sessions.json";

/// One tab as persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTab {
    /// File name of the tab's autosave file, relative to the autosave directory.
    pub autosave_file_name: String,
    /// File the tab was opened from or saved to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub tabs: Vec<PersistedTab>,
    #[serde(default)]
    pub selected_index: usize,
}

impl WorkspaceState {
    /// `<autosave_dir>/sessions.json`.
    pub fn path_in(autosave_dir: &Path) -> PathBuf {
        autosave_dir.join(WORKSPACE_FILE_NAME)
    }

    /// Reads the state at `path`. A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut state: WorkspaceState = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        state.clamp_selection();
        Ok(Some(state))
    }

    /// Writes the state through a temp file renamed over `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory can't be created or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))
    }

    fn clamp_selection(&mut self) {
        self.selected_index = self.selected_index.min(self.tabs.len().saturating_sub(1));
    }
}
