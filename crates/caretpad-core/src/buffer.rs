//! Versioned document text backed by `ropey::Rope`.

use std::fmt;

use anyhow::Result;
use ropey::Rope;

/// The text of one editing session.
///
/// Offsets are char (Unicode scalar value) indices. Every successful mutation
/// bumps [`TextBuffer::version`], which downstream caches compare against to
/// detect staleness even when an edit leaves the length unchanged.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    version: u64,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            version: 0,
        }
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl TextBuffer {
    /// Creates an empty buffer at version 0.
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            version: 0,
        }
    }

    /// Mutation counter; strictly increases on every edit.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns true if the last char is `'\n'`.
    pub fn ends_with_newline(&self) -> bool {
        let len = self.rope.len_chars();
        len > 0 && self.rope.char(len - 1) == '\n'
    }

    /// Returns an iterator over chars starting at `char_idx` (clamped to the end).
    pub fn chars_at(&self, char_idx: usize) -> ropey::iter::Chars<'_> {
        self.rope.chars_at(char_idx.min(self.rope.len_chars()))
    }

    /// Returns the char at `char_idx`, or `None` past the end.
    pub fn char_at(&self, char_idx: usize) -> Option<char> {
        (char_idx < self.rope.len_chars()).then(|| self.rope.char(char_idx))
    }

    /// Returns the text in `[start..end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or out of bounds.
    pub fn slice(&self, start: usize, end: usize) -> Result<ropey::RopeSlice<'_>> {
        self.check_range(start, end)?;
        Ok(self.rope.slice(start..end))
    }

    /// Inserts `text` at `char_idx`.
    ///
    /// # Errors
    ///
    /// Returns an error if `char_idx` is past the end of the buffer.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<()> {
        if char_idx > self.rope.len_chars() {
            anyhow::bail!(
                "insert position {} out of bounds (buffer has {} chars)",
                char_idx,
                self.rope.len_chars()
            );
        }
        if text.is_empty() {
            return Ok(());
        }
        self.rope.insert(char_idx, text);
        self.bump();
        Ok(())
    }

    /// Removes `[start..end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or out of bounds.
    pub fn remove(&mut self, start: usize, end: usize) -> Result<()> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(());
        }
        self.rope.remove(start..end);
        self.bump();
        Ok(())
    }

    /// Replaces `[start..end)` with `text` as a single version step.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or out of bounds.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        self.check_range(start, end)?;
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.bump();
        Ok(())
    }

    /// Swaps in entirely new content (e.g. after loading a file).
    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.bump();
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end {
            anyhow::bail!("invalid range: start ({}) > end ({})", start, end);
        }
        if end > self.rope.len_chars() {
            anyhow::bail!(
                "range end {} out of bounds (buffer has {} chars)",
                end,
                self.rope.len_chars()
            );
        }
        Ok(())
    }
}
