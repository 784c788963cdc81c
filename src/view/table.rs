//! Windowed table widget.
//!
//! Renders only the rows the engine materializes: buffer rows above the
//! scroll position are skipped, rows past the bottom edge are never asked
//! for. The last line is a status bar.

use crate::model::Record;
use crate::state::{AppState, InputMode};
use crate::view::constants::{
    COLUMN_GAP, HEADER_HEIGHT, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH, STATUS_BAR_HEIGHT,
};
use crate::view::styles::TableStyles;
use crate::view::text::{display_width, fit};
use crate::view_state::{Column, SortDirection};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Placeholder shown when the dataset is empty.
pub const NO_DATA: &str = "No data";
/// Placeholder shown when filters exclude every row.
pub const NO_MATCHES: &str = "No rows match the current filters";

/// Lines available for rows in a table of `area_height` lines.
pub fn body_height(area_height: u16) -> usize {
    area_height.saturating_sub(HEADER_HEIGHT + STATUS_BAR_HEIGHT) as usize
}

/// Table widget over [`AppState`].
pub struct TableView<'a> {
    state: &'a AppState,
    styles: &'a TableStyles,
}

impl<'a> TableView<'a> {
    /// Create a widget borrowing the state for one frame.
    pub fn new(state: &'a AppState, styles: &'a TableStyles) -> Self {
        Self { state, styles }
    }

    /// Terminal cursor position while a filter is being typed.
    pub fn filter_cursor(&self, area: Rect) -> Option<(u16, u16)> {
        let InputMode::Filter(draft) = &self.state.input else {
            return None;
        };
        if area.height == 0 {
            return None;
        }
        let before: String = draft.text.chars().take(draft.cursor).collect();
        let offset = display_width(&filter_prompt(&draft.column)) + display_width(&before);
        let x = (area.x as usize + offset).min(area.right().saturating_sub(1) as usize) as u16;
        Some((x, area.bottom() - 1))
    }

    fn header_text(&self, column: &Column<Record>) -> String {
        let engine = self.state.engine();
        let mut text = column.label().to_string();
        if engine.filters().get(column.id()).is_some() {
            text.push('*');
        }
        match self.state.sort_direction_of(column.id()) {
            Some(SortDirection::Ascending) => text.push_str(" ▲"),
            Some(SortDirection::Descending) => text.push_str(" ▼"),
            None => {}
        }
        text
    }

    /// Column widths sized to the header and the materialized rows.
    fn column_widths(&self) -> Vec<usize> {
        let engine = self.state.engine();
        engine
            .columns()
            .iter()
            .map(|column| {
                let widest_cell = engine
                    .visible_rows()
                    .map(|(_, row)| display_width(&column.display(row)))
                    .max()
                    .unwrap_or(0);
                display_width(&self.header_text(column))
                    .max(widest_cell)
                    .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    /// First column to draw so the selected column fits in `width`.
    fn first_column(&self, widths: &[usize], width: usize) -> usize {
        let selected = self.state.selected_column().min(widths.len().saturating_sub(1));
        let mut first = 0;
        while first < selected {
            let span: usize = widths[first..=selected].iter().sum::<usize>()
                + (selected - first) * COLUMN_GAP;
            if span <= width {
                break;
            }
            first += 1;
        }
        first
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer, widths: &[usize], first: usize) {
        let columns = self.state.engine().columns();
        let selected = self.state.selected_column();
        let mut x = area.x as usize;
        for (index, column) in columns.iter().enumerate().skip(first) {
            if x >= area.right() as usize {
                break;
            }
            let width = widths[index].min(area.right() as usize - x);
            let style = if index == selected {
                self.styles.selected_header
            } else {
                self.styles.header
            };
            buf.set_stringn(x as u16, area.y, fit(&self.header_text(column), width), width, style);
            x += widths[index] + COLUMN_GAP;
        }
    }

    fn render_body(&self, area: Rect, buf: &mut Buffer, widths: &[usize], first: usize) {
        let engine = self.state.engine();
        if engine.processed_len() == 0 {
            let text = if engine.rows().is_empty() {
                NO_DATA
            } else {
                NO_MATCHES
            };
            buf.set_stringn(area.x, area.y, text, area.width as usize, self.styles.placeholder);
            return;
        }

        let row_height = engine.config().row_height().as_usize();
        let scroll = engine.viewport().scroll_offset;
        let body_lines = area.height as usize;

        for (position, row) in engine.visible_rows() {
            let top = position * row_height;
            // Buffer rows above the viewport are materialized but not drawn.
            if top < scroll {
                continue;
            }
            let line = top - scroll;
            if line >= body_lines {
                break;
            }
            let y = area.y + line as u16;
            let mut x = area.x as usize;
            for (index, column) in engine.columns().iter().enumerate().skip(first) {
                if x >= area.right() as usize {
                    break;
                }
                let width = widths[index].min(area.right() as usize - x);
                buf.set_stringn(x as u16, y, fit(&column.display(row), width), width, self.styles.cell);
                x += widths[index] + COLUMN_GAP;
            }
        }
    }

    fn status_text(&self, body_lines: usize) -> String {
        if let InputMode::Filter(draft) = &self.state.input {
            return format!("{}{}", filter_prompt(&draft.column), draft.text);
        }

        let engine = self.state.engine();
        let shown = engine.processed_len();
        let mut text = if shown == 0 {
            "0 rows".to_string()
        } else {
            let row_height = engine.config().row_height().as_usize();
            let scroll = engine.viewport().scroll_offset;
            let first = engine.first_visible() + 1;
            let last = (scroll + body_lines).div_ceil(row_height).min(shown);
            format!("rows {first}-{last} of {shown}")
        };
        let total = engine.rows().len();
        if total != shown {
            text.push_str(&format!(" (filtered from {total})"));
        }
        if let Some(status) = &self.state.status {
            text.push_str(" | ");
            text.push_str(status);
        }
        text
    }
}

fn filter_prompt(column: &str) -> String {
    format!("Filter {column}: ")
}

impl Widget for TableView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let widths = self.column_widths();
        let first = self.first_column(&widths, area.width as usize);

        let header = Rect { height: HEADER_HEIGHT.min(area.height), ..area };
        self.render_header(header, buf, &widths, first);

        let body_lines = body_height(area.height);
        if body_lines > 0 {
            let body = Rect {
                y: area.y + HEADER_HEIGHT,
                height: body_lines as u16,
                ..area
            };
            self.render_body(body, buf, &widths, first);
        }

        if area.height > HEADER_HEIGHT {
            let style = if self.state.is_editing_filter() {
                self.styles.filter_input
            } else {
                self.styles.status
            };
            let y = area.bottom() - STATUS_BAR_HEIGHT;
            let text = fit(&self.status_text(body_lines), area.width as usize);
            buf.set_stringn(area.x, y, text, area.width as usize, style);
        }
    }
}
