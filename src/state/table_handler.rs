//! Table keyboard action handler.
//!
//! Pure function that transforms AppState in response to navigation, sort
//! and filter actions. Actions with side effects (refresh, quit) only set
//! flags here; the event loop performs them.

use crate::model::KeyAction;
use crate::state::filter_input::start_filter_input;
use crate::state::AppState;
use crate::view_state::SortDirection;

/// Handle a keyboard action in normal mode.
///
/// `Refresh` is left to the caller, which owns the cache and the data source.
pub fn handle_table_action(state: &mut AppState, action: KeyAction) {
    match action {
        KeyAction::ScrollUp => state.engine_mut().scroll_rows(-1),
        KeyAction::ScrollDown => state.engine_mut().scroll_rows(1),
        KeyAction::PageUp => state.engine_mut().scroll_pages(-1),
        KeyAction::PageDown => state.engine_mut().scroll_pages(1),
        KeyAction::ScrollToTop => state.engine_mut().scroll_to_top(),
        KeyAction::ScrollToBottom => state.engine_mut().scroll_to_bottom(),
        KeyAction::NextColumn => state.select_column_by(1),
        KeyAction::PrevColumn => state.select_column_by(-1),
        KeyAction::ToggleSort => toggle_sort_on_selected(state),
        KeyAction::StartFilter => start_filter_input(state),
        KeyAction::ClearFilters => {
            state.engine_mut().clear_filters();
            state.status = Some("Filters cleared".to_string());
        }
        KeyAction::Quit => state.should_quit = true,
        KeyAction::Refresh => {}
    }
}

fn toggle_sort_on_selected(state: &mut AppState) {
    let Some(column) = state.selected_column_id().map(str::to_string) else {
        return;
    };
    if !state.engine_mut().toggle_sort(&column) {
        state.status = Some(format!("Column {column} cannot be sorted"));
        return;
    }
    state.status = Some(match state.sort_direction_of(&column) {
        Some(SortDirection::Ascending) => format!("Sorted by {column} ascending"),
        Some(SortDirection::Descending) => format!("Sorted by {column} descending"),
        None => "Original order".to_string(),
    });
}

#[cfg(test)]
#[path = "table_handler_tests.rs"]
mod tests;
