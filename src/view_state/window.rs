//! The full windowing pass: filter, sort, then window.

use super::column::Columns;
use super::pipeline::{process, FilterSet, SortSpec};
use super::types::{RowHeight, Viewport, WindowConfigError};
use super::visible_range::{compute_visible_range, VisibleRange};

/// Validated windowing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowConfig {
    row_height: RowHeight,
    buffer_rows: usize,
}

impl WindowConfig {
    /// Rows padded on each side of the viewport when nothing else is said.
    pub const DEFAULT_BUFFER_ROWS: usize = 5;

    /// Create a config, rejecting a zero row height.
    pub fn new(row_height: u32, buffer_rows: usize) -> Result<Self, WindowConfigError> {
        Ok(Self {
            row_height: RowHeight::new(row_height)?,
            buffer_rows,
        })
    }

    /// Create a config from signed values, as read from user configuration.
    pub fn from_signed(row_height: i64, buffer_rows: i64) -> Result<Self, WindowConfigError> {
        let row_height = RowHeight::try_from(row_height)?;
        let buffer_rows = usize::try_from(buffer_rows)
            .map_err(|_| WindowConfigError::NegativeBufferRows(buffer_rows))?;
        Ok(Self {
            row_height,
            buffer_rows,
        })
    }

    /// Height of each row.
    pub fn row_height(&self) -> RowHeight {
        self.row_height
    }

    /// Rows padded on each side of the viewport.
    pub fn buffer_rows(&self) -> usize {
        self.buffer_rows
    }

    /// Visible range for `len` processed rows.
    pub fn visible_range(&self, len: usize, viewport: Viewport) -> VisibleRange {
        compute_visible_range(len, viewport, self.row_height, self.buffer_rows)
    }

    /// Total scrollable height of `len` rows.
    pub fn total_height(&self, len: usize) -> usize {
        len.saturating_mul(self.row_height.as_usize())
    }

    /// Largest meaningful scroll offset for `len` rows in a viewport of
    /// `viewport_height`.
    pub fn max_scroll(&self, len: usize, viewport_height: usize) -> usize {
        self.total_height(len).saturating_sub(viewport_height)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            row_height: RowHeight::ONE,
            buffer_rows: Self::DEFAULT_BUFFER_ROWS,
        }
    }
}

/// Everything a windowing pass depends on besides the data itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowQuery {
    /// Active filters.
    pub filters: FilterSet,
    /// Active sort, if any.
    pub sort: Option<SortSpec>,
    /// Scroll position and height.
    pub viewport: Viewport,
}

/// Result of one windowing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Processed dataset as positions into the original rows.
    pub processed: Vec<usize>,
    /// Slice of `processed` to materialize.
    pub range: VisibleRange,
    /// Scrollable height of the processed dataset.
    pub total_height: usize,
}

impl WindowSnapshot {
    /// Original-row positions of the materialized rows, in display order.
    pub fn visible_indices(&self) -> &[usize] {
        &self.processed[self.range.as_range()]
    }

    /// Materialized rows in display order, paired with their original position.
    pub fn visible_rows<'a, R>(&'a self, rows: &'a [R]) -> impl Iterator<Item = (usize, &'a R)> + 'a {
        self.visible_indices().iter().map(move |&i| (i, &rows[i]))
    }

    /// Whether the processed dataset is empty, in which case the caller
    /// shows a "no data" placeholder.
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

/// Run the whole pipeline for one render pass.
///
/// Pure and side-effect free: recomputing with identical inputs yields an
/// identical snapshot, so it is safe to call on every scroll event.
pub fn compute_window<R>(
    rows: &[R],
    columns: &Columns<R>,
    query: &WindowQuery,
    config: WindowConfig,
) -> WindowSnapshot {
    let processed = process(rows, columns, &query.filters, query.sort.as_ref());
    let range = config.visible_range(processed.len(), query.viewport);
    let total_height = config.total_height(processed.len());
    WindowSnapshot {
        processed,
        range,
        total_height,
    }
}
