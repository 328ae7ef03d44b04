//! Integration tests for the caretpad App using egui_kittest.
//!
//! These tests exercise the full `eframe::App::update` loop.

mod common;

use egui::{Key, Modifiers};
use egui_kittest::kittest::Queryable;

use common::create_harness;

const CTRL: Modifiers = Modifiers::CTRL;

#[test]
fn test_app_initial_state() {
    let (harness, _dir) = create_harness();
    let app = harness.state();
    assert_eq!(app.tabs().tab_count(), 1);
    assert_eq!(app.tabs().active_session().title, "Untitled");
    assert!((app.font_size() - 14.0).abs() < f32::EPSILON);
}

#[test]
fn test_editor_takes_focus_and_accepts_text() {
    let (mut harness, _dir) = create_harness();
    harness.run();
    assert!(harness.state().tabs().active_session().is_focused());

    harness.event(egui::Event::Text("hello".into()));
    harness.run();
    assert_eq!(harness.state().tabs().active_session().text(), "hello");

    harness.key_press_modifiers(Modifiers::NONE, Key::Enter);
    harness.run();
    harness.key_press_modifiers(Modifiers::NONE, Key::Backspace);
    harness.run();
    assert_eq!(harness.state().tabs().active_session().text(), "hello");
}

#[test]
fn test_zoom_shortcuts_change_font_size() {
    let (mut harness, _dir) = create_harness();
    harness.key_press_modifiers(CTRL, Key::Plus);
    harness.run();
    assert!((harness.state().font_size() - 15.0).abs() < f32::EPSILON);

    harness.key_press_modifiers(CTRL, Key::Minus);
    harness.run();
    harness.key_press_modifiers(CTRL, Key::Minus);
    harness.run();
    assert!((harness.state().font_size() - 13.0).abs() < f32::EPSILON);
    assert!(
        (harness.state().tabs().active_session().font_size() - 13.0).abs() < f32::EPSILON
    );
}

#[test]
fn test_new_tab_shortcut_and_button() {
    let (mut harness, _dir) = create_harness();
    harness.key_press_modifiers(CTRL, Key::T);
    harness.run();
    assert_eq!(harness.state().tabs().tab_count(), 2);
    assert_eq!(harness.state().tabs().active_session().title, "Untitled 2");

    harness.get_by_label("+").click();
    harness.run();
    assert_eq!(harness.state().tabs().tab_count(), 3);
    assert_eq!(harness.state().tabs().active, 2);
}

#[test]
fn test_close_tab_shortcut() {
    let (mut harness, _dir) = create_harness();
    harness.key_press_modifiers(CTRL, Key::T);
    harness.run();
    harness.key_press_modifiers(CTRL, Key::W);
    harness.run();
    assert_eq!(harness.state().tabs().tab_count(), 1);

    // Closing the last tab leaves a fresh one.
    harness.key_press_modifiers(CTRL, Key::W);
    harness.run();
    assert_eq!(harness.state().tabs().tab_count(), 1);
}

#[test]
fn test_zoom_leaves_ui_scale_alone() {
    let (mut harness, _dir) = create_harness();
    harness.key_press_modifiers(CTRL, Key::Plus);
    harness.run();
    // UI scale stays at 1.0; only the editor font grew.
    assert!(!harness.ctx.options(|o| o.zoom_with_keyboard));
    assert!((harness.ctx.zoom_factor() - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_ctrl_z_and_ctrl_y() {
    let (mut harness, _dir) = create_harness();
    harness.run();
    harness.event(egui::Event::Text("hello".into()));
    harness.run();

    harness.key_press_modifiers(CTRL, Key::Z);
    harness.run();
    assert_eq!(harness.state().tabs().active_session().text(), "");

    harness.key_press_modifiers(CTRL, Key::Y);
    harness.run();
    assert_eq!(harness.state().tabs().active_session().text(), "hello");
}

#[test]
fn test_ctrl_tab_cycles_tabs() {
    let (mut harness, _dir) = create_harness();
    harness.key_press_modifiers(CTRL, Key::T);
    harness.run();
    harness.key_press_modifiers(CTRL, Key::T);
    harness.run();
    assert_eq!(harness.state().tabs().active, 2);

    harness.key_press_modifiers(CTRL, Key::Tab);
    harness.run();
    assert_eq!(harness.state().tabs().active, 0);

    harness.key_press_modifiers(CTRL | Modifiers::SHIFT, Key::Tab);
    harness.run();
    assert_eq!(harness.state().tabs().active, 2);
}

#[test]
fn test_ctrl_s_saves_file_backed_tab() {
    let (mut harness, dir) = create_harness();
    let file = dir.path().join("saved.txt");
    std::fs::write(&file, "").unwrap();
    harness.state_mut().tabs_mut().open_file(&file).unwrap();
    harness.run();
    harness.state_mut().tabs_mut().active_session_mut().insert_text("kept");
    harness.run();

    harness.key_press_modifiers(CTRL, Key::S);
    harness.run();
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "kept");
    assert!(!harness.state().tabs().active_session().is_modified());
}
