//! Domain-level keyboard actions independent of key bindings.

/// User intents the table viewer understands.
///
/// The mapping from `crossterm::event::KeyEvent` to `KeyAction` is handled
/// by [`KeyBindings`](crate::config::KeyBindings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// Scroll up by one row. Default: k/↑
    ScrollUp,
    /// Scroll down by one row. Default: j/↓
    ScrollDown,
    /// Scroll up by one viewport height. Default: Ctrl+u/Page Up
    PageUp,
    /// Scroll down by one viewport height. Default: Ctrl+d/Page Down
    PageDown,
    /// Jump to the first row. Default: g/Home
    ScrollToTop,
    /// Jump to the last row. Default: G/End
    ScrollToBottom,

    // Columns
    /// Select the column to the right. Default: l/→/Tab
    NextColumn,
    /// Select the column to the left. Default: h/←/Shift+Tab
    PrevColumn,
    /// Cycle the sort on the selected column. Default: s/Enter
    ToggleSort,

    // Filtering
    /// Start typing a filter for the selected column. Default: /
    StartFilter,
    /// Drop every filter. Default: c
    ClearFilters,

    // Application controls
    /// Drop the cached dataset and reload it. Default: r
    Refresh,
    /// Exit the application. Default: q/Ctrl+c
    Quit,
}
