//! Application state.
//!
//! AppState is the root state type containing all UI state. Transitions are
//! pure functions in the sibling handler modules; the event loop only feeds
//! them and renders the result.

use crate::model::Record;
use crate::view_state::{Columns, SortDirection, WindowedListEngine};

// ===== InputMode =====

/// Whether keys are interpreted as commands or as filter text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keys go through the key bindings.
    #[default]
    Normal,
    /// Keys edit the filter of one column.
    Filter(FilterDraft),
}

/// Filter text being edited. Applied to the engine on every keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDraft {
    /// Column being filtered.
    pub column: String,
    /// Current text.
    pub text: String,
    /// Cursor position in characters, `0..=text.chars().count()`.
    pub cursor: usize,
    /// Filter value before editing started, restored on cancel.
    pub original: String,
}

// ===== AppState =====

/// Application state. Pure data, no side effects.
#[derive(Debug)]
pub struct AppState {
    engine: WindowedListEngine<Record>,

    /// Index of the selected column. Always a valid index when columns exist.
    selected_column: usize,

    /// Command or filter-editing mode.
    pub input: InputMode,

    /// One-line message for the status bar.
    pub status: Option<String>,

    /// Set by the quit action; the event loop exits after the next draw.
    pub should_quit: bool,
}

impl AppState {
    /// Create state around an engine, selecting the first column.
    pub fn new(engine: WindowedListEngine<Record>) -> Self {
        Self {
            engine,
            selected_column: 0,
            input: InputMode::Normal,
            status: None,
            should_quit: false,
        }
    }

    /// The windowed table.
    pub fn engine(&self) -> &WindowedListEngine<Record> {
        &self.engine
    }

    /// Mutable access to the windowed table.
    pub fn engine_mut(&mut self) -> &mut WindowedListEngine<Record> {
        &mut self.engine
    }

    /// Index of the selected column.
    pub fn selected_column(&self) -> usize {
        self.selected_column
    }

    /// Id of the selected column, `None` when there are no columns.
    pub fn selected_column_id(&self) -> Option<&str> {
        self.engine.columns().at(self.selected_column).map(|c| c.id())
    }

    /// Move the column selection by `delta`, wrapping at both ends.
    pub fn select_column_by(&mut self, delta: isize) {
        let count = self.engine.columns().len();
        if count == 0 {
            return;
        }
        let count = count as isize;
        self.selected_column = (self.selected_column as isize + delta).rem_euclid(count) as usize;
    }

    /// Swap in freshly loaded data. Filters and sort stay in place; the
    /// selection is clamped to the new column count.
    pub fn replace_data(&mut self, columns: Columns<Record>, rows: Vec<Record>) {
        self.engine.set_columns(columns);
        self.engine.set_rows(rows);
        let count = self.engine.columns().len();
        if self.selected_column >= count {
            self.selected_column = count.saturating_sub(1);
        }
    }

    /// Whether a filter is being typed.
    pub fn is_editing_filter(&self) -> bool {
        matches!(self.input, InputMode::Filter(_))
    }

    /// Sort indicator for the column with `id`, if the table is sorted by it.
    pub fn sort_direction_of(&self, id: &str) -> Option<SortDirection> {
        self.engine
            .sort()
            .filter(|spec| spec.column == id)
            .map(|spec| spec.direction)
    }
}
