//! Grouped undo/redo history for a [`TextBuffer`](crate::TextBuffer).
//!
//! Edits recorded within [`DEFAULT_GROUP_TIMEOUT`] of each other form one
//! group, so a typing burst undoes in a single step.

use std::time::{Duration, Instant};

pub const DEFAULT_GROUP_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DEPTH: usize = 1_000;

/// A single replacement: `deleted` was removed at `position` and `inserted`
/// put in its place. Positions are char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    pub position: usize,
    pub inserted: String,
    pub deleted: String,
    pub caret_before: usize,
    pub caret_after: usize,
}

impl EditOperation {
    /// Char range `inserted` occupies after the edit.
    pub fn inserted_range(&self) -> std::ops::Range<usize> {
        self.position..self.position + self.inserted.chars().count()
    }

    /// Char range `deleted` occupied before the edit.
    pub fn deleted_range(&self) -> std::ops::Range<usize> {
        self.position..self.position + self.deleted.chars().count()
    }
}

#[derive(Debug, Clone)]
struct EditGroup {
    operations: Vec<EditOperation>,
}

#[derive(Debug)]
pub struct UndoHistory {
    undo_stack: Vec<EditGroup>,
    redo_stack: Vec<EditGroup>,
    last_edit: Option<Instant>,
    group_timeout: Duration,
    max_depth: usize,
    paused: bool,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_TIMEOUT, DEFAULT_MAX_DEPTH)
    }
}

impl UndoHistory {
    pub fn new(group_timeout: Duration, max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            last_edit: None,
            group_timeout,
            max_depth: max_depth.max(1),
            paused: false,
        }
    }

    /// Records `op` made at `now`. Clears the redo stack.
    pub fn record(&mut self, op: EditOperation, now: Instant) {
        if self.paused {
            return;
        }
        let joins_group = self
            .last_edit
            .is_some_and(|last| now.saturating_duration_since(last) < self.group_timeout);
        self.last_edit = Some(now);
        self.redo_stack.clear();

        if joins_group {
            if let Some(group) = self.undo_stack.last_mut() {
                group.operations.push(op);
                return;
            }
        }
        self.undo_stack.push(EditGroup {
            operations: vec![op],
        });
        if self.undo_stack.len() > self.max_depth {
            let excess = self.undo_stack.len() - self.max_depth;
            self.undo_stack.drain(..excess);
        }
    }

    /// Makes the next recorded edit start a new group.
    pub fn break_group(&mut self) {
        self.last_edit = None;
    }

    /// Pops the latest group. Apply the operations in reverse order.
    pub fn undo(&mut self) -> Option<Vec<EditOperation>> {
        let group = self.undo_stack.pop()?;
        let ops = group.operations.clone();
        self.redo_stack.push(group);
        self.last_edit = None;
        Some(ops)
    }

    /// Pops the latest undone group. Apply the operations in order.
    pub fn redo(&mut self) -> Option<Vec<EditOperation>> {
        let group = self.redo_stack.pop()?;
        let ops = group.operations.clone();
        self.undo_stack.push(group);
        self.last_edit = None;
        Some(ops)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Stops recording, e.g. while undo itself edits the buffer.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_edit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(position: usize, inserted: &str, deleted: &str) -> EditOperation {
        EditOperation {
            position,
            inserted: inserted.to_string(),
            deleted: deleted.to_string(),
            caret_before: position,
            caret_after: position + inserted.chars().count(),
        }
    }

    #[test]
    fn edits_inside_timeout_share_a_group() {
        let t0 = Instant::now();
        let mut history = UndoHistory::default();
        history.record(op(0, "a", ""), t0);
        history.record(op(1, "b", ""), t0 + Duration::from_millis(100));
        history.record(op(2, "c", ""), t0 + Duration::from_millis(700));

        assert_eq!(history.undo().unwrap().len(), 1);
        let ops = history.undo().unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].inserted, "a");
        assert!(!history.can_undo());
    }

    #[test]
    fn break_group_separates_edits() {
        let t0 = Instant::now();
        let mut history = UndoHistory::default();
        history.record(op(0, "a", ""), t0);
        history.break_group();
        history.record(op(1, "b", ""), t0);
        assert_eq!(history.undo().unwrap()[0].inserted, "b");
        assert_eq!(history.undo().unwrap()[0].inserted, "a");
    }

    #[test]
    fn new_edit_clears_redo() {
        let t0 = Instant::now();
        let mut history = UndoHistory::default();
        history.record(op(0, "a", ""), t0);
        history.undo();
        assert!(history.can_redo());
        assert_eq!(history.redo().unwrap()[0].inserted, "a");

        history.undo();
        history.record(op(0, "z", ""), t0 + Duration::from_secs(1));
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
    }

    #[test]
    fn paused_history_ignores_edits() {
        let mut history = UndoHistory::default();
        history.pause();
        history.record(op(0, "a", ""), Instant::now());
        assert!(!history.can_undo());
        history.resume();
        history.record(op(0, "b", ""), Instant::now());
        assert!(history.can_undo());
    }

    #[test]
    fn depth_is_bounded() {
        let t0 = Instant::now();
        let mut history = UndoHistory::new(Duration::ZERO, 2);
        for (i, s) in ["a", "b", "c"].into_iter().enumerate() {
            history.record(op(i, s, ""), t0);
        }
        assert_eq!(history.undo().unwrap()[0].inserted, "c");
        assert_eq!(history.undo().unwrap()[0].inserted, "b");
        assert!(history.undo().is_none());
    }

    #[test]
    fn ranges_count_chars() {
        let edit = op(2, "é!", "abc");
        assert_eq!(edit.inserted_range(), 2..4);
        assert_eq!(edit.deleted_range(), 2..5);
    }
}
