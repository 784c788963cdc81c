//! Stateful windowed list.
//!
//! Owns the rows and the user's sort/filter/scroll state. The processed order
//! is recomputed eagerly whenever rows, filters or sort change; scroll and
//! resize only re-derive the visible range from it.

use super::column::Columns;
use super::pipeline::{process, FilterSet, SortDirection, SortSpec};
use super::types::Viewport;
use super::visible_range::VisibleRange;
use super::window::{WindowConfig, WindowQuery, WindowSnapshot};
use tracing::trace;

/// Windowed, sortable, filterable view over a dataset.
#[derive(Debug)]
pub struct WindowedListEngine<R> {
    rows: Vec<R>,
    columns: Columns<R>,
    config: WindowConfig,
    filters: FilterSet,
    sort: Option<SortSpec>,
    viewport: Viewport,
    processed: Vec<usize>,
}

impl<R> WindowedListEngine<R> {
    /// Create an empty engine.
    pub fn new(columns: Columns<R>, config: WindowConfig) -> Self {
        Self {
            rows: Vec::new(),
            columns,
            config,
            filters: FilterSet::new(),
            sort: None,
            viewport: Viewport::default(),
            processed: Vec::new(),
        }
    }

    /// Create an engine already holding `rows`.
    pub fn with_rows(columns: Columns<R>, config: WindowConfig, rows: Vec<R>) -> Self {
        let mut engine = Self::new(columns, config);
        engine.set_rows(rows);
        engine
    }

    // ===== Inputs that change the processed order =====

    /// Replace the dataset.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.reprocess();
    }

    /// Replace the column set. Filters and sort naming removed columns stop
    /// having any effect.
    pub fn set_columns(&mut self, columns: Columns<R>) {
        self.columns = columns;
        self.reprocess();
    }

    /// Set or clear (empty substring) the filter on `column`.
    pub fn set_filter(&mut self, column: &str, substring: &str) {
        if self.filters.set(column, substring) {
            self.reprocess();
        }
    }

    /// Remove every filter.
    pub fn clear_filters(&mut self) {
        if self.filters.clear() {
            self.reprocess();
        }
    }

    /// Set or clear the sort.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        if self.sort != sort {
            self.sort = sort;
            self.reprocess();
        }
    }

    /// Cycle the sort on `column`: ascending, descending, unsorted.
    ///
    /// Sorting on another column starts again at ascending. Returns `false`
    /// without changing anything if the column is unknown or not sortable.
    pub fn toggle_sort(&mut self, column: &str) -> bool {
        if !self.columns.get(column).is_some_and(|c| c.is_sortable()) {
            return false;
        }
        let next = match &self.sort {
            Some(spec) if spec.column == column => match spec.direction {
                SortDirection::Ascending => Some(SortSpec::descending(column)),
                SortDirection::Descending => None,
            },
            _ => Some(SortSpec::ascending(column)),
        };
        self.set_sort(next);
        true
    }

    fn reprocess(&mut self) {
        self.processed = process(&self.rows, &self.columns, &self.filters, self.sort.as_ref());
        self.clamp_scroll();
        trace!(
            rows = self.rows.len(),
            processed = self.processed.len(),
            "Reprocessed windowed list"
        );
    }

    // ===== Scrolling =====

    /// Set the viewport height, keeping the scroll offset in bounds.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport.height = height;
        self.clamp_scroll();
    }

    /// Scroll to an absolute offset, clamped to the scrollable extent.
    pub fn scroll_to(&mut self, offset: usize) {
        self.viewport.scroll_offset = offset;
        self.clamp_scroll();
    }

    /// Scroll by a signed amount.
    pub fn scroll_by(&mut self, delta: isize) {
        let offset = if delta >= 0 {
            self.viewport.scroll_offset.saturating_add(delta.unsigned_abs())
        } else {
            self.viewport.scroll_offset.saturating_sub(delta.unsigned_abs())
        };
        self.scroll_to(offset);
    }

    /// Scroll by whole rows.
    pub fn scroll_rows(&mut self, rows: isize) {
        let unit = self.config.row_height().as_usize() as isize;
        self.scroll_by(rows.saturating_mul(unit));
    }

    /// Scroll by one viewport height in either direction.
    pub fn scroll_pages(&mut self, pages: isize) {
        let page = self.viewport.height.max(self.config.row_height().as_usize()) as isize;
        self.scroll_by(pages.saturating_mul(page));
    }

    /// Jump to the top.
    pub fn scroll_to_top(&mut self) {
        self.scroll_to(0);
    }

    /// Jump to the bottom.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_to(usize::MAX);
    }

    /// Scroll the least amount needed for processed position `position` to
    /// be fully visible. Out-of-range positions clamp to the last row.
    pub fn scroll_to_row(&mut self, position: usize) {
        if self.processed.is_empty() {
            return;
        }
        let unit = self.config.row_height().as_usize();
        let position = position.min(self.processed.len() - 1);
        let top = position * unit;
        let bottom = top + unit;

        if top < self.viewport.scroll_offset {
            self.scroll_to(top);
        } else if bottom > self.viewport.scroll_offset + self.viewport.height {
            self.scroll_to(bottom.saturating_sub(self.viewport.height));
        }
    }

    fn clamp_scroll(&mut self) {
        let max = self.max_scroll();
        if self.viewport.scroll_offset > max {
            self.viewport.scroll_offset = max;
        }
    }

    // ===== Derived state =====

    /// Rows as supplied, in original order.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Column descriptors.
    pub fn columns(&self) -> &Columns<R> {
        &self.columns
    }

    /// Windowing parameters.
    pub fn config(&self) -> WindowConfig {
        self.config
    }

    /// Active filters.
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Active sort.
    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Current scroll position and height.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Processed order as positions into [`rows`](Self::rows).
    pub fn processed(&self) -> &[usize] {
        &self.processed
    }

    /// Number of rows after filtering.
    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }

    /// Scrollable height of the processed rows.
    pub fn total_height(&self) -> usize {
        self.config.total_height(self.processed.len())
    }

    /// Largest valid scroll offset.
    pub fn max_scroll(&self) -> usize {
        self.config
            .max_scroll(self.processed.len(), self.viewport.height)
    }

    /// Processed position of the first row intersecting the viewport.
    pub fn first_visible(&self) -> usize {
        self.viewport.scroll_offset / self.config.row_height().as_usize()
    }

    /// Rows to materialize.
    pub fn visible_range(&self) -> VisibleRange {
        self.config.visible_range(self.processed.len(), self.viewport)
    }

    /// Materialized rows with their processed position, in display order.
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &R)> + '_ {
        let range = self.visible_range();
        self.processed[range.as_range()]
            .iter()
            .zip(range.as_range())
            .map(move |(&row, position)| (position, &self.rows[row]))
    }

    /// Inputs of the current pass, as accepted by
    /// [`compute_window`](super::window::compute_window).
    pub fn query(&self) -> WindowQuery {
        WindowQuery {
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            viewport: self.viewport,
        }
    }

    /// Owned snapshot of the current pass.
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            processed: self.processed.clone(),
            range: self.visible_range(),
            total_height: self.total_height(),
        }
    }
}
