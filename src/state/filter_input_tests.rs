//! Tests for filter input handler.

use super::*;
use crate::source::{infer_columns, records_from_value};
use crate::view_state::{WindowConfig, WindowedListEngine};
use serde_json::json;

fn state() -> AppState {
    let rows = records_from_value(json!([
        {"name": "alpha", "region": "eu"},
        {"name": "beta", "region": "us"},
        {"name": "gamma", "region": "eu"},
        {"name": "Ålesund", "region": "eu"},
    ]))
    .unwrap();
    let columns = infer_columns(&rows);
    AppState::new(WindowedListEngine::with_rows(columns, WindowConfig::default(), rows))
}

fn editing() -> AppState {
    let mut state = state();
    start_filter_input(&mut state);
    state
}

fn draft(state: &AppState) -> &FilterDraft {
    match &state.input {
        InputMode::Filter(draft) => draft,
        other => panic!("Expected filter mode, got {:?}", other),
    }
}

fn type_text(state: &mut AppState, text: &str) {
    for ch in text.chars() {
        handle_filter_char(state, ch);
    }
}

// ===== start_filter_input =====

#[test]
fn start_creates_empty_draft_for_selected_column() {
    let state = editing();
    let draft = draft(&state);
    assert_eq!(draft.column, "name");
    assert_eq!(draft.text, "");
    assert_eq!(draft.cursor, 0);
}

#[test]
fn start_resumes_existing_filter_with_cursor_at_end() {
    let mut state = state();
    state.engine_mut().set_filter("name", "al");
    start_filter_input(&mut state);
    assert_eq!(draft(&state).text, "al");
    assert_eq!(draft(&state).cursor, 2);
}

#[test]
fn start_while_editing_is_noop() {
    let mut state = editing();
    type_text(&mut state, "be");
    start_filter_input(&mut state);
    assert_eq!(draft(&state).text, "be");
}

// ===== editing =====

#[test]
fn typing_filters_live() {
    let mut state = editing();
    type_text(&mut state, "ET");
    assert_eq!(state.engine().processed_len(), 1);
    assert_eq!(state.engine().filters().get("name"), Some("ET"));
}

#[test]
fn backspace_widens_filter_again() {
    let mut state = editing();
    type_text(&mut state, "alp");
    assert_eq!(state.engine().processed_len(), 1);
    handle_filter_backspace(&mut state);
    handle_filter_backspace(&mut state);
    assert_eq!(draft(&state).text, "a");
    assert_eq!(state.engine().processed_len(), 3);
}

#[test]
fn backspace_at_start_is_noop() {
    let mut state = editing();
    handle_filter_backspace(&mut state);
    assert_eq!(draft(&state).text, "");
    assert_eq!(state.engine().processed_len(), 4);
}

#[test]
fn cursor_moves_are_char_aware() {
    let mut state = editing();
    type_text(&mut state, "Åle");
    handle_filter_cursor_left(&mut state);
    handle_filter_cursor_left(&mut state);
    assert_eq!(draft(&state).cursor, 1);

    handle_filter_char(&mut state, 'x');
    assert_eq!(draft(&state).text, "Åxle");

    handle_filter_backspace(&mut state);
    handle_filter_backspace(&mut state);
    assert_eq!(draft(&state).text, "le");
}

#[test]
fn cursor_saturates_at_both_ends() {
    let mut state = editing();
    type_text(&mut state, "ab");
    handle_filter_cursor_right(&mut state);
    assert_eq!(draft(&state).cursor, 2);
    for _ in 0..5 {
        handle_filter_cursor_left(&mut state);
    }
    assert_eq!(draft(&state).cursor, 0);
}

#[test]
fn editing_outside_filter_mode_is_noop() {
    let mut state = state();
    handle_filter_char(&mut state, 'x');
    assert_eq!(state.input, InputMode::Normal);
    assert!(state.engine().filters().is_empty());
}

// ===== commit / cancel =====

#[test]
fn commit_keeps_filter_and_reports_it() {
    let mut state = editing();
    type_text(&mut state, "eu");
    commit_filter(&mut state);
    assert_eq!(state.input, InputMode::Normal);
    assert_eq!(state.engine().filters().get("name"), Some("eu"));
    assert_eq!(state.status.as_deref(), Some("Filtering name by \"eu\""));
}

#[test]
fn commit_of_empty_text_reports_cleared() {
    let mut state = editing();
    commit_filter(&mut state);
    assert_eq!(state.status.as_deref(), Some("Filter on name cleared"));
    assert!(state.engine().filters().is_empty());
}

#[test]
fn cancel_restores_previous_filter() {
    let mut state = state();
    state.engine_mut().set_filter("name", "a");
    start_filter_input(&mut state);
    type_text(&mut state, "lpha");
    assert_eq!(state.engine().processed_len(), 1);

    cancel_filter(&mut state);

    assert_eq!(state.input, InputMode::Normal);
    assert_eq!(state.engine().filters().get("name"), Some("a"));
    assert_eq!(state.engine().processed_len(), 3);
}
