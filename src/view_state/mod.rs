//! View-state layer - windowing, sorting, filtering and pagination
//!
//! Everything here is independent of the terminal. Callers describe their
//! rows through [`Columns`], and get back positions into the original data
//! plus the slice of them worth materializing.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (RowHeight, Viewport) and WindowConfigError
//! - `visible_range`: VisibleRange - result of visible range calculation
//! - `column`: CellValue, Column, Columns - typed column accessors
//! - `pipeline`: FilterSet, SortSpec - filter then stable sort over row positions
//! - `window`: WindowConfig, compute_window - the pure per-render pass
//! - `engine`: WindowedListEngine - stateful list with cached processed order
//! - `pagination`: Paginator - page-at-a-time alternative to windowing

pub mod column;
pub mod engine;
pub mod pagination;
pub mod pipeline;
pub mod types;
pub mod visible_range;
pub mod window;

pub use column::{CellValue, Column, Columns};
pub use engine::WindowedListEngine;
pub use pagination::{compute_page, PageSlice, PageSnapshot, Paginator};
pub use pipeline::{filter_indices, process, sort_indices, FilterSet, SortDirection, SortSpec};
pub use types::{RowHeight, Viewport, WindowConfigError};
pub use visible_range::{compute_visible_range, VisibleRange};
pub use window::{compute_window, WindowConfig, WindowQuery, WindowSnapshot};
