//! Line-start table for fast offset → line-number lookup.
//!
//! The table is rebuilt lazily: mutations never touch it, the next query
//! notices the buffer moved on and rescans the text once. Between edits a
//! lookup is a binary search over the line starts.

use std::ops::Range;

use crate::buffer::TextBuffer;

/// Text snapshot the table was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BuiltFor {
    len: usize,
    version: u64,
}

/// Cached line starts for one document.
///
/// `starts[i]` is the char offset of the first char of line `i + 1`; the
/// table always begins with 0 and is strictly increasing.
#[derive(Debug, Clone)]
pub struct LineIndexCache {
    starts: Vec<usize>,
    built_for: Option<BuiltFor>,
    rebuilds: u64,
}

impl Default for LineIndexCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LineIndexCache {
    pub fn new() -> Self {
        Self {
            starts: vec![0],
            built_for: None,
            rebuilds: 0,
        }
    }

    /// Returns the 1-based line number containing `offset`.
    ///
    /// Offsets past the end are clamped to the text length, so the line after
    /// a trailing newline is addressable at `len`.
    pub fn line_number(&mut self, text: &TextBuffer, offset: usize) -> usize {
        self.ensure(text);
        let offset = offset.min(text.len_chars());
        // Greatest index whose start is <= offset.
        self.starts.partition_point(|&start| start <= offset)
    }

    /// Number of lines, counting the empty line after a trailing newline.
    pub fn line_count(&mut self, text: &TextBuffer) -> usize {
        self.ensure(text);
        self.starts.len()
    }

    /// Char range of the 1-based `line`, including its terminating newline.
    ///
    /// Returns `None` for line numbers outside the document.
    pub fn line_range(&mut self, text: &TextBuffer, line: usize) -> Option<Range<usize>> {
        self.ensure(text);
        let start = *self.starts.get(line.checked_sub(1)?)?;
        let end = self
            .starts
            .get(line)
            .copied()
            .unwrap_or_else(|| text.len_chars());
        Some(start..end)
    }

    /// Drops the table; the next query rescans. Calling it repeatedly is a no-op.
    pub fn invalidate(&mut self) {
        self.starts.clear();
        self.starts.push(0);
        self.built_for = None;
    }

    /// True when the table matches `text` and no rescan is needed.
    pub fn is_fresh(&self, text: &TextBuffer) -> bool {
        self.built_for == Some(Self::snapshot(text))
    }

    /// How many full rescans have happened.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    fn snapshot(text: &TextBuffer) -> BuiltFor {
        BuiltFor {
            len: text.len_chars(),
            version: text.version(),
        }
    }

    fn ensure(&mut self, text: &TextBuffer) {
        if self.is_fresh(text) {
            return;
        }

        self.starts.clear();
        self.starts.push(0);
        for (idx, ch) in text.chars_at(0).enumerate() {
            if ch == '\n' {
                self.starts.push(idx + 1);
            }
        }
        self.built_for = Some(Self::snapshot(text));
        self.rebuilds += 1;
        tracing::trace!(
            lines = self.starts.len(),
            len = text.len_chars(),
            version = text.version(),
            "rebuilt line index"
        );
    }
}
