//! Filter input handling (pure state transitions).
//!
//! Handles text input while [`InputMode::Filter`] is active. Every edit is
//! applied to the engine immediately so the table narrows as the user types.
//! All functions are no-ops outside filter mode.

use crate::state::app_state::{AppState, FilterDraft, InputMode};

/// Start editing the filter of the selected column.
///
/// The draft starts from the column's current filter with the cursor at the
/// end. No-op if already editing or if there are no columns.
pub fn start_filter_input(state: &mut AppState) {
    if state.is_editing_filter() {
        return;
    }
    let Some(column) = state.selected_column_id().map(str::to_string) else {
        return;
    };
    let original = state
        .engine()
        .filters()
        .get(&column)
        .unwrap_or_default()
        .to_string();
    state.input = InputMode::Filter(FilterDraft {
        cursor: original.chars().count(),
        text: original.clone(),
        column,
        original,
    });
}

/// Insert `ch` at the cursor and advance it.
pub fn handle_filter_char(state: &mut AppState, ch: char) {
    edit_draft(state, |draft| {
        let at = byte_offset(&draft.text, draft.cursor);
        draft.text.insert(at, ch);
        draft.cursor += 1;
        true
    });
}

/// Delete the character before the cursor, if any.
pub fn handle_filter_backspace(state: &mut AppState) {
    edit_draft(state, |draft| {
        if draft.cursor == 0 {
            return false;
        }
        let at = byte_offset(&draft.text, draft.cursor - 1);
        draft.text.remove(at);
        draft.cursor -= 1;
        true
    });
}

/// Move the cursor one character left, saturating at 0.
pub fn handle_filter_cursor_left(state: &mut AppState) {
    edit_draft(state, |draft| {
        draft.cursor = draft.cursor.saturating_sub(1);
        false
    });
}

/// Move the cursor one character right, saturating at the end.
pub fn handle_filter_cursor_right(state: &mut AppState) {
    edit_draft(state, |draft| {
        draft.cursor = (draft.cursor + 1).min(draft.text.chars().count());
        false
    });
}

/// Keep the typed filter and return to normal mode.
pub fn commit_filter(state: &mut AppState) {
    if let InputMode::Filter(draft) = std::mem::take(&mut state.input) {
        state.status = Some(if draft.text.is_empty() {
            format!("Filter on {} cleared", draft.column)
        } else {
            format!("Filtering {} by \"{}\"", draft.column, draft.text)
        });
    }
}

/// Restore the filter that was active before editing and return to normal mode.
pub fn cancel_filter(state: &mut AppState) {
    if let InputMode::Filter(draft) = std::mem::take(&mut state.input) {
        state.engine_mut().set_filter(&draft.column, &draft.original);
    }
}

/// Apply `edit` to the draft; re-filter when it reports a text change.
fn edit_draft(state: &mut AppState, edit: impl FnOnce(&mut FilterDraft) -> bool) {
    let InputMode::Filter(draft) = &mut state.input else {
        return;
    };
    if edit(draft) {
        let column = draft.column.clone();
        let text = draft.text.clone();
        state.engine_mut().set_filter(&column, &text);
    }
}

/// Byte offset of character `index`, or the end of the string.
fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map_or(text.len(), |(offset, _)| offset)
}

// ===== Tests =====

#[cfg(test)]
#[path = "filter_input_tests.rs"]
mod tests;
