//! Tests for the table action handler.

use super::*;
use crate::source::{infer_columns, records_from_value};
use crate::state::InputMode;
use crate::view_state::{SortSpec, WindowConfig, WindowedListEngine};
use serde_json::{json, Value};

fn state_with(rows: Value, viewport_height: usize) -> AppState {
    let rows = records_from_value(rows).unwrap();
    let columns = infer_columns(&rows);
    let mut engine = WindowedListEngine::with_rows(columns, WindowConfig::default(), rows);
    engine.set_viewport_height(viewport_height);
    AppState::new(engine)
}

fn numbered(n: usize) -> AppState {
    let rows: Vec<Value> = (0..n).map(|i| json!({"id": i, "tags": [i]})).collect();
    state_with(Value::Array(rows), 10)
}

fn offset(state: &AppState) -> usize {
    state.engine().viewport().scroll_offset
}

fn after(mut state: AppState, actions: &[KeyAction]) -> AppState {
    for &action in actions {
        handle_table_action(&mut state, action);
    }
    state
}

// ===== scrolling =====

#[test]
fn scroll_down_then_up_returns_to_top() {
    let mut state = numbered(100);
    handle_table_action(&mut state, KeyAction::ScrollDown);
    assert_eq!(offset(&state), 1);
    handle_table_action(&mut state, KeyAction::ScrollUp);
    assert_eq!(offset(&state), 0);
}

#[test]
fn scroll_up_at_top_stays_at_top() {
    let state = after(numbered(100), &[KeyAction::ScrollUp]);
    assert_eq!(offset(&state), 0);
}

#[test]
fn page_down_moves_one_viewport() {
    let mut state = numbered(100);
    handle_table_action(&mut state, KeyAction::PageDown);
    assert_eq!(offset(&state), 10);
    handle_table_action(&mut state, KeyAction::PageUp);
    assert_eq!(offset(&state), 0);
}

#[test]
fn bottom_and_top_jump_to_extremes() {
    let mut state = numbered(100);
    handle_table_action(&mut state, KeyAction::ScrollToBottom);
    assert_eq!(offset(&state), 90);
    assert_eq!(state.engine().visible_range().end, 100);
    handle_table_action(&mut state, KeyAction::ScrollToTop);
    assert_eq!(offset(&state), 0);
}

#[test]
fn scrolling_short_table_is_noop() {
    let state = after(numbered(3), &[KeyAction::PageDown]);
    assert_eq!(offset(&state), 0);
}

// ===== sorting =====

#[test]
fn toggle_sort_cycles_and_reports() {
    let mut state = numbered(5);

    handle_table_action(&mut state, KeyAction::ToggleSort);
    assert_eq!(state.engine().sort(), Some(&SortSpec::ascending("id")));
    assert_eq!(state.status.as_deref(), Some("Sorted by id ascending"));

    handle_table_action(&mut state, KeyAction::ToggleSort);
    assert_eq!(state.status.as_deref(), Some("Sorted by id descending"));
    let first = state.engine().visible_rows().next().map(|(_, r)| r["id"].clone());
    assert_eq!(first, Some(json!(4)));

    handle_table_action(&mut state, KeyAction::ToggleSort);
    assert_eq!(state.engine().sort(), None);
    assert_eq!(state.status.as_deref(), Some("Original order"));
}

#[test]
fn toggle_sort_on_nested_column_is_refused() {
    let state = after(numbered(5), &[KeyAction::NextColumn, KeyAction::ToggleSort]);
    assert_eq!(state.engine().sort(), None);
    assert_eq!(state.status.as_deref(), Some("Column tags cannot be sorted"));
}

#[test]
fn toggle_sort_without_columns_is_noop() {
    let state = after(state_with(json!([]), 10), &[KeyAction::ToggleSort]);
    assert_eq!(state.engine().sort(), None);
    assert_eq!(state.status, None);
}

// ===== filtering =====

#[test]
fn start_filter_enters_filter_mode() {
    let state = after(numbered(5), &[KeyAction::StartFilter]);
    assert!(matches!(state.input, InputMode::Filter(_)));
}

#[test]
fn clear_filters_restores_rows() {
    let mut state = numbered(20);
    state.engine_mut().set_filter("id", "1");
    assert_eq!(state.engine().processed_len(), 11);

    handle_table_action(&mut state, KeyAction::ClearFilters);

    assert_eq!(state.engine().processed_len(), 20);
    assert_eq!(state.status.as_deref(), Some("Filters cleared"));
}

// ===== application =====

#[test]
fn quit_sets_flag() {
    let state = after(numbered(1), &[KeyAction::Quit]);
    assert!(state.should_quit);
}

#[test]
fn refresh_is_left_to_caller() {
    let state = after(numbered(3), &[KeyAction::Refresh]);
    assert_eq!(state.engine().processed_len(), 3);
    assert!(!state.should_quit);
}
