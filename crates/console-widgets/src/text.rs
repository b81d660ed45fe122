//! Display-width helpers shared by the form and table widgets.

use ratatui::buffer::Buffer;
use ratatui::style::Style;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate to a display width, accounting for wide characters.
pub(crate) fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('\u{2026}');
    out
}

/// Write `text` at `(x, y)` without crossing `right`; returns the next column.
pub(crate) fn put(buf: &mut Buffer, x: u16, y: u16, right: u16, text: &str, style: Style) -> u16 {
    if x >= right {
        return x;
    }
    let max = (right - x) as usize;
    let fitted = fit(text, max);
    let (next_x, _) = buf.set_stringn(x, y, &fitted, max, style);
    next_x
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    #[test]
    fn test_fit() {
        assert_eq!(fit("hello", 10), "hello");
        assert_eq!(fit("hello world", 6), "hello\u{2026}");
        // Hangul is two columns wide.
        assert_eq!(fit("차량번호", 5), "차량\u{2026}");
        assert_eq!(fit("abc", 0), "");
    }

    #[test]
    fn test_put_stops_at_right_edge() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        let next = put(&mut buf, 2, 0, 6, "abcdefgh", Style::default());
        assert_eq!(next, 6);
        assert_eq!(buf[(5, 0)].symbol(), "\u{2026}");
        assert_eq!(buf[(6, 0)].symbol(), " ");
    }
}
