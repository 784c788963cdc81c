//! Page-based slicing: the non-virtualized sibling of windowing.
//!
//! Uses the same filter/sort pipeline, but slices fixed-size pages instead of
//! deriving a range from scroll position.

use super::column::Columns;
use super::pipeline::{process, FilterSet, SortSpec};
use super::types::WindowConfigError;
use std::ops::Range;

/// Validated page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    /// Create a paginator, rejecting a zero page size.
    pub fn new(page_size: usize) -> Result<Self, WindowConfigError> {
        if page_size == 0 {
            return Err(WindowConfigError::NonPositivePageSize(0));
        }
        Ok(Self { page_size })
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages for `len` rows. Zero rows means zero pages.
    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    /// Slice for `page` of `len` rows. Pages past the end clamp to the last one.
    pub fn slice(&self, len: usize, page: usize) -> PageSlice {
        let page_count = self.page_count(len);
        let page = page.min(page_count.saturating_sub(1));
        let start = page.saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        PageSlice {
            page,
            page_count,
            start,
            end,
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self { page_size: 25 }
    }
}

/// One page of a processed dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageSlice {
    /// Page actually shown after clamping (0-based).
    pub page: usize,
    /// Total number of pages.
    pub page_count: usize,
    /// First processed position on the page (inclusive).
    pub start: usize,
    /// Last processed position on the page (exclusive).
    pub end: usize,
}

impl PageSlice {
    /// Positions as a standard range.
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count
    }

    /// Whether an earlier page exists.
    pub fn has_prev(&self) -> bool {
        self.page > 0
    }
}

/// Result of one paginated pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Processed dataset as positions into the original rows.
    pub processed: Vec<usize>,
    /// Slice of `processed` on the requested page.
    pub slice: PageSlice,
}

impl PageSnapshot {
    /// Original-row positions on this page, in display order.
    pub fn page_indices(&self) -> &[usize] {
        &self.processed[self.slice.as_range()]
    }
}

/// Filter, sort, then cut out `page`.
pub fn compute_page<R>(
    rows: &[R],
    columns: &Columns<R>,
    filters: &FilterSet,
    sort: Option<&SortSpec>,
    paginator: Paginator,
    page: usize,
) -> PageSnapshot {
    let processed = process(rows, columns, filters, sort);
    let slice = paginator.slice(processed.len(), page);
    PageSnapshot { processed, slice }
}
