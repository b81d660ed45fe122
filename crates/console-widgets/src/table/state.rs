//! Cursor and scroll state for a table instance.

/// State for the table widget.
#[derive(Debug, Clone, Default)]
pub struct TableState {
    /// Cursor row (display index)
    pub cursor: Option<usize>,
    /// Focused widget column, counted among widget columns only
    pub widget: usize,
    /// Scroll offset (first visible row)
    pub scroll_offset: usize,
    /// Number of visible rows (set during render)
    pub(crate) visible_rows: usize,
}

impl TableState {
    /// Create a new empty table state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Move the cursor to a row.
    pub fn select(&mut self, index: usize) {
        self.cursor = Some(index);
        self.ensure_visible(index);
    }

    pub fn deselect(&mut self) {
        self.cursor = None;
    }

    /// Move the cursor by `delta` rows within `row_count`.
    pub fn move_cursor(&mut self, delta: isize, row_count: usize) {
        if row_count == 0 {
            self.cursor = None;
            return;
        }
        let current = self.cursor.unwrap_or(0);
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            (current + delta as usize).min(row_count - 1)
        };
        self.select(next);
    }

    /// Keep the cursor inside a row count that may have shrunk.
    pub fn clamp(&mut self, row_count: usize) {
        match self.cursor {
            Some(_) if row_count == 0 => self.cursor = None,
            Some(idx) if idx >= row_count => self.cursor = Some(row_count - 1),
            _ => {}
        }
        if self.scroll_offset >= row_count {
            self.scroll_offset = row_count.saturating_sub(1);
        }
    }

    /// Cycle the focused widget column.
    pub fn cycle_widget(&mut self, delta: isize, widget_count: usize) {
        if widget_count == 0 {
            self.widget = 0;
            return;
        }
        let count = widget_count as isize;
        self.widget = (self.widget as isize + delta).rem_euclid(count) as usize;
    }

    pub fn ensure_visible(&mut self, row: usize) {
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if self.visible_rows > 0 && row >= self.scroll_offset + self.visible_rows {
            self.scroll_offset = row + 1 - self.visible_rows;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
