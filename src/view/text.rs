//! Fixed-width cell text.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Ellipsis marking truncated text.
pub const ELLIPSIS: char = '…';

/// Fit `text` into exactly `width` terminal cells.
///
/// Control characters become spaces. Text that is too wide is cut and ends
/// in [`ELLIPSIS`]; shorter text is padded with spaces. A wide character
/// that would straddle the edge is replaced by padding.
pub fn fit(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let clean: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    let mut out = String::with_capacity(width);
    let mut used = 0;
    if clean.width() <= width {
        out.push_str(&clean);
        used = clean.width();
    } else {
        let budget = width - 1;
        for c in clean.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > budget {
                break;
            }
            out.push(c);
            used += w;
        }
        out.push(ELLIPSIS);
        used += 1;
    }
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}

/// Display width of `text` in terminal cells.
pub fn display_width(text: &str) -> usize {
    text.width()
}
