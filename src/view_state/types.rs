//! Core windowing newtypes and configuration errors.

use thiserror::Error;

/// Invalid windowing or pagination parameters.
///
/// Raised at construction time, before any rendering pass can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindowConfigError {
    /// Row height must be at least one unit.
    #[error("Row height must be positive (got {0})")]
    NonPositiveRowHeight(i64),

    /// Row height does not fit in 32 bits.
    #[error("Row height {0} exceeds the maximum of {max}", max = u32::MAX)]
    RowHeightOutOfRange(i64),

    /// Buffer rows cannot be negative.
    #[error("Buffer rows must not be negative (got {0})")]
    NegativeBufferRows(i64),

    /// Page size must be at least one row.
    #[error("Page size must be positive (got {0})")]
    NonPositivePageSize(i64),
}

/// Height of one row in scroll units. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowHeight(u32);

impl RowHeight {
    /// One unit per row, the natural height for terminal lines.
    pub const ONE: Self = Self(1);

    /// Smart constructor rejecting zero.
    pub fn new(height: u32) -> Result<Self, WindowConfigError> {
        if height == 0 {
            Err(WindowConfigError::NonPositiveRowHeight(0))
        } else {
            Ok(Self(height))
        }
    }

    /// Raw value.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Raw value as `usize` for offset arithmetic.
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl Default for RowHeight {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for RowHeight {
    type Error = WindowConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(WindowConfigError::NonPositiveRowHeight(value));
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| WindowConfigError::RowHeightOutOfRange(value))
    }
}

/// Scroll position and visible extent, in the same units as [`RowHeight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Viewport {
    /// Distance scrolled from the top of the content.
    pub scroll_offset: usize,
    /// Height of the visible area.
    pub height: usize,
}

impl Viewport {
    /// Create a viewport.
    pub fn new(scroll_offset: usize, height: usize) -> Self {
        Self {
            scroll_offset,
            height,
        }
    }
}
