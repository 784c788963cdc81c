//! Layout dimension constants for TUI rendering.

/// Height of the column header in lines.
pub const HEADER_HEIGHT: u16 = 1;

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Columns never shrink below this many cells.
pub const MIN_COLUMN_WIDTH: usize = 3;

/// Columns never grow beyond this many cells; longer values are truncated.
pub const MAX_COLUMN_WIDTH: usize = 24;

/// Cells between adjacent columns.
pub const COLUMN_GAP: usize = 1;

/// How long the event loop waits for input before redrawing.
pub const POLL_INTERVAL_MS: u64 = 250;
