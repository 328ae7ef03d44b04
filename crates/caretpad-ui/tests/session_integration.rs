//! Integration tests for `EditorSession` timing: caret blink, redraw
//! coalescing, autosave debounce and teardown, driven by a manual clock.

mod common;

use std::time::{Duration, Instant};

use caretpad_core::RedrawFlags;
use caretpad_ui::editor::CaretState;
use caretpad_ui::SessionEvent;

use common::session_in;

const BLINK: Duration = Duration::from_millis(500);

#[test]
fn test_blink_alternates_each_interval() {
    let dir = tempfile::tempdir().unwrap();
    let start = Instant::now();
    let mut session = session_in(dir.path(), start);
    session.handle(SessionEvent::FocusChanged(true));
    assert_eq!(session.caret().state(), CaretState::FocusedVisible);

    for n in 1..=5u32 {
        session.advance(start + BLINK * n);
        let expected = if n % 2 == 1 {
            CaretState::FocusedHidden
        } else {
            CaretState::FocusedVisible
        };
        assert_eq!(session.caret().state(), expected, "after {n} intervals");
    }
}

#[test]
fn test_typing_restarts_blink_phase() {
    let dir = tempfile::tempdir().unwrap();
    let start = Instant::now();
    let mut session = session_in(dir.path(), start);
    session.handle(SessionEvent::FocusChanged(true));
    session.advance(start + BLINK);
    assert_eq!(session.caret().state(), CaretState::FocusedHidden);

    session.insert_text("a");
    assert_eq!(session.caret().state(), CaretState::FocusedVisible);
    // The next toggle is a full interval after the edit.
    session.advance(start + BLINK + BLINK / 2);
    assert_eq!(session.caret().state(), CaretState::FocusedVisible);
    session.advance(start + BLINK * 2);
    assert_eq!(session.caret().state(), CaretState::FocusedHidden);
}

#[test]
fn test_selection_hides_caret_until_collapsed() {
    let dir = tempfile::tempdir().unwrap();
    let start = Instant::now();
    let mut session = session_in(dir.path(), start);
    session.insert_text("hello");
    session.handle(SessionEvent::FocusChanged(true));

    session.set_selection(0, 3);
    assert_eq!(session.caret().state(), CaretState::Unfocused);
    session.advance(start + BLINK * 3);
    assert_eq!(session.caret().state(), CaretState::Unfocused);

    session.move_caret(2, false);
    assert_eq!(session.caret().state(), CaretState::FocusedVisible);
}

#[test]
fn test_typing_burst_coalesces_into_one_redraw() {
    let dir = tempfile::tempdir().unwrap();
    let start = Instant::now();
    let mut session = session_in(dir.path(), start);
    for ch in ["a", "b", "c", "d"] {
        session.insert_text(ch);
    }
    assert_eq!(session.pending_redraw(), RedrawFlags::ALL);

    let fired = session.advance(start + Duration::from_millis(10));
    assert_eq!(fired, RedrawFlags::ALL);
    assert!(session.pending_redraw().is_empty());
    assert!(session
        .advance(start + Duration::from_millis(30))
        .is_empty());
}

#[test]
fn test_autosave_waits_for_quiet_period() {
    let dir = tempfile::tempdir().unwrap();
    let start = Instant::now();
    let mut session = session_in(dir.path(), start);
    let path = session.autosave_path().to_path_buf();

    session.insert_text("draft");
    session.advance(start + Duration::from_millis(500));
    session.insert_text(" two");
    // 800ms after the first edit, but only 300ms after the second.
    session.advance(start + Duration::from_millis(800));
    assert!(!path.exists());

    session.advance(start + Duration::from_millis(1300));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "draft two");
    assert!(!session.is_dirty());
}

#[test]
fn test_close_flushes_and_ignores_later_events() {
    let dir = tempfile::tempdir().unwrap();
    let start = Instant::now();
    let mut session = session_in(dir.path(), start);
    session.handle(SessionEvent::FocusChanged(true));
    session.insert_text("unsaved");
    session.close();

    assert!(session.is_closed());
    assert_eq!(session.timers().pending_count(), 0);
    assert_eq!(
        std::fs::read_to_string(session.autosave_path()).unwrap(),
        "unsaved"
    );

    session.insert_text("more");
    session.handle(SessionEvent::FocusChanged(true));
    assert!(session.advance(start + Duration::from_secs(5)).is_empty());
    assert_eq!(session.text(), "unsaved");
    assert_eq!(session.caret().state(), CaretState::Unfocused);
    assert_eq!(session.timers().pending_count(), 0);
}

#[test]
fn test_replace_all_resets_caret_and_lines() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path(), Instant::now());
    session.insert_text("one\ntwo");
    session.replace_all("a\nb\nc\nd");
    assert_eq!(session.caret_offset(), 0);
    session.move_caret(7, false);
    session.move_line_start(false);
    assert_eq!(session.caret_offset(), 6);
}
