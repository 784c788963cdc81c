//! UI state machine (pure).
//!
//! All state transitions are pure functions testable without TUI.

pub mod app_state;
pub mod filter_input;
pub mod table_handler;

// Re-export for convenience
pub use app_state::{AppState, FilterDraft, InputMode};
pub use filter_input::{
    cancel_filter, commit_filter, handle_filter_backspace, handle_filter_char,
    handle_filter_cursor_left, handle_filter_cursor_right, start_filter_input,
};
pub use table_handler::handle_table_action;
