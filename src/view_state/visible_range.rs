//! Visible range calculation.

use super::types::{RowHeight, Viewport};
use std::ops::Range;

/// Contiguous slice of processed rows to materialize.
///
/// Rows outside `[start, end)` are represented only by reserved blank space
/// so the total scrollable height stays correct.
///
/// # Invariants
/// - `start <= end <= processed length`
/// - `space_before == start * row_height`
/// - `space_after == (processed length - end) * row_height`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct VisibleRange {
    /// First materialized position (inclusive).
    pub start: usize,
    /// Last materialized position (exclusive).
    pub end: usize,
    /// Blank space reserved above the materialized rows.
    pub space_before: usize,
    /// Blank space reserved below the materialized rows.
    pub space_after: usize,
}

impl VisibleRange {
    /// Number of materialized rows.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether nothing is materialized.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Positions as a standard range.
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether `position` is materialized.
    pub fn contains(&self, position: usize) -> bool {
        self.as_range().contains(&position)
    }
}

/// Compute the rows to materialize for a processed dataset of length `len`.
///
/// The scroll offset is first clamped to the scrollable extent. The range
/// then spans every row that intersects the viewport, padded by
/// `buffer_rows` on each side and clamped to `[0, len]`.
///
/// This is a pure function: identical inputs always give identical output.
pub fn compute_visible_range(
    len: usize,
    viewport: Viewport,
    row_height: RowHeight,
    buffer_rows: usize,
) -> VisibleRange {
    if len == 0 {
        return VisibleRange::default();
    }

    let unit = row_height.as_usize();
    let total_height = len.saturating_mul(unit);
    let max_scroll = total_height.saturating_sub(viewport.height);
    let scroll = viewport.scroll_offset.min(max_scroll);

    let first_visible = scroll / unit;
    let visible_end = scroll.saturating_add(viewport.height).div_ceil(unit);

    let start = first_visible.saturating_sub(buffer_rows).min(len);
    let end = visible_end.saturating_add(buffer_rows).min(len).max(start);

    VisibleRange {
        start,
        end,
        space_before: start * unit,
        space_after: (len - end) * unit,
    }
}
