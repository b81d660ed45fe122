//! Generic table wrapper with a create/destroy lifecycle per container.
//!
//! A page owns one [`TableSlot`] per table it shows. The slot holds at most
//! one [`TableInstance`]; creating a second one requires destroying the first.
//! Construction requested before the slot was ever drawn is kept pending and
//! materialized by the first [`TableSlot::attach`] during render.
//!
//! # Example
//!
//! ```ignore
//! use console_widgets::{Column, ColumnWidth, TableOptions, TableSlot, TableView};
//!
//! struct Vehicle {
//!     carno: String,
//!     selected: bool,
//! }
//!
//! let columns = vec![
//!     Column::checkbox("", "select", |v: &Vehicle| v.selected),
//!     Column::new("차량번호", |v: &Vehicle| v.carno.clone().into())
//!         .sortable(true),
//!     Column::button("상세", "detail", "상세"),
//! ];
//!
//! let mut slot = TableSlot::new();
//! slot.create(columns, Vec::new(), TableOptions::default())?;
//!
//! // during render
//! if let Some(table) = slot.attach(area) {
//!     frame.render_stateful_widget(TableView::new(), area, table);
//! }
//! ```

mod cell;
mod column;
mod state;

pub use cell::CellContent;
pub use column::{CellAction, CellActionKind, CellWidget, Column, ColumnWidth};
pub use state::TableState;

use crate::text::put;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, StatefulWidget, Widget};
use unicode_width::UnicodeWidthStr;

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use thiserror::Error;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Rows moved by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Table lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("a table already exists in this container; destroy it first")]
    AlreadyCreated,
    #[error("no table has been created in this container")]
    NotCreated,
    #[error("column {0} does not exist")]
    ColumnOutOfRange(usize),
    #[error("column {0} is not sortable")]
    NotSortable(usize),
}

/// Sort direction for columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Toggle the sort direction.
    pub fn toggle(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Display options applied at construction.
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Text shown when no row is visible
    pub placeholder: String,
    pub show_header: bool,
    /// Alternate the background of every other row
    pub striped: bool,
    /// Show a row cursor and allow cell activation
    pub selectable: bool,
    pub header_style: Style,
    pub stripe_style: Style,
    pub highlight_style: Style,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            placeholder: "No data".into(),
            show_header: true,
            striped: true,
            selectable: true,
            header_style: Style::default().add_modifier(Modifier::BOLD),
            stripe_style: Style::default().bg(Color::Rgb(30, 30, 30)),
            highlight_style: Style::default().bg(Color::Blue).fg(Color::White),
        }
    }
}

impl TableOptions {
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }

    pub fn show_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }

    pub fn striped(mut self, striped: bool) -> Self {
        self.striped = striped;
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }
}

/// Result of [`TableSlot::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Created {
    /// The instance exists now
    Ready,
    /// The container was never drawn; the instance appears on first attach
    Deferred,
}

/// Outcome of a key press on a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableResponse {
    Ignored,
    Handled,
    /// A cell widget was activated
    Action(CellAction),
}

/// A mounted table: columns, rows, filter and sort over them.
pub struct TableInstance<T> {
    id: u64,
    columns: Vec<Column<T>>,
    rows: Vec<T>,
    options: TableOptions,
    /// Lowercased filter query
    filter: Option<String>,
    sort: Option<(usize, SortDirection)>,
    /// Row indices in display order
    view: Vec<usize>,
    state: TableState,
    dirty: bool,
}

impl<T> TableInstance<T> {
    fn new(columns: Vec<Column<T>>, rows: Vec<T>, options: TableOptions) -> Self {
        let id = NEXT_INSTANCE_ID.fetch_add(1, AtomicOrdering::Relaxed);
        tracing::debug!(table = id, columns = columns.len(), rows = rows.len(), "table created");
        let mut table = Self {
            id,
            columns,
            rows,
            options,
            filter: None,
            sort: None,
            view: Vec::new(),
            state: TableState::default(),
            dirty: true,
        };
        table.rebuild();
        table
    }

    /// Unique id of this instance.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// All rows in data order, ignoring filter and sort.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Replace all rows.
    pub fn set_data(&mut self, rows: Vec<T>) {
        tracing::debug!(table = self.id, rows = rows.len(), "table data replaced");
        self.rows = rows;
        self.rebuild();
        self.state.clamp(self.view.len());
        self.dirty = true;
    }

    /// Show only rows whose filterable columns contain `query` (case-insensitive).
    pub fn set_filter(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.clear_filter();
            return;
        }
        self.filter = Some(query.to_lowercase());
        self.rebuild();
        self.state.scroll_offset = 0;
        self.state.clamp(self.view.len());
        self.dirty = true;
    }

    pub fn clear_filter(&mut self) {
        if self.filter.take().is_some() {
            self.rebuild();
            self.state.clamp(self.view.len());
            self.dirty = true;
        }
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Sort by a sortable column.
    pub fn sort_by(&mut self, column: usize, direction: SortDirection) -> Result<(), TableError> {
        let col = self
            .columns
            .get(column)
            .ok_or(TableError::ColumnOutOfRange(column))?;
        if !col.sortable {
            return Err(TableError::NotSortable(column));
        }
        self.sort = Some((column, direction));
        self.rebuild();
        self.dirty = true;
        Ok(())
    }

    pub fn clear_sort(&mut self) {
        if self.sort.take().is_some() {
            self.rebuild();
            self.dirty = true;
        }
    }

    pub fn sort(&self) -> Option<(usize, SortDirection)> {
        self.sort
    }

    /// Step the sort through every sortable column, ascending then descending,
    /// and back to data order after the last one.
    pub fn cycle_sort(&mut self) -> Option<(usize, SortDirection)> {
        let sortable: Vec<usize> = (0..self.columns.len())
            .filter(|&i| self.columns[i].sortable)
            .collect();
        let next = match self.sort {
            None => sortable.first().map(|&c| (c, SortDirection::Ascending)),
            Some((column, SortDirection::Ascending)) => Some((column, SortDirection::Descending)),
            Some((column, SortDirection::Descending)) => sortable
                .iter()
                .find(|&&c| c > column)
                .map(|&c| (c, SortDirection::Ascending)),
        };
        match next {
            Some((column, direction)) => {
                // Only sortable columns reach here.
                let _ = self.sort_by(column, direction);
            }
            None => self.clear_sort(),
        }
        self.sort
    }

    /// Request a repaint without changing data.
    pub fn redraw(&mut self) {
        self.dirty = true;
    }

    /// Whether something changed since the last render.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of visible (filtered) rows.
    pub fn row_count(&self) -> usize {
        self.view.len()
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Data index of a display row.
    pub fn data_index(&self, display_index: usize) -> Option<usize> {
        self.view.get(display_index).copied()
    }

    /// Get a row by display index.
    pub fn get_row(&self, display_index: usize) -> Option<&T> {
        self.data_index(display_index).and_then(|i| self.rows.get(i))
    }

    /// Row under the cursor.
    pub fn cursor_row(&self) -> Option<&T> {
        self.state.cursor().and_then(|i| self.get_row(i))
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TableState {
        &mut self.state
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) -> TableResponse {
        if key.code == KeyCode::Char('s') {
            let sorted = self.cycle_sort();
            tracing::debug!(table = self.id, ?sorted, "sort changed");
            return TableResponse::Handled;
        }

        let rows = self.view.len();
        if rows == 0 {
            return TableResponse::Ignored;
        }

        if !self.options.selectable {
            let delta = match key.code {
                KeyCode::Up | KeyCode::Char('k') => -1,
                KeyCode::Down | KeyCode::Char('j') => 1,
                KeyCode::PageUp => -PAGE_STEP,
                KeyCode::PageDown => PAGE_STEP,
                _ => return TableResponse::Ignored,
            };
            let offset = self.state.scroll_offset as isize + delta;
            self.state.scroll_offset = offset.clamp(0, rows as isize - 1) as usize;
            self.dirty = true;
            return TableResponse::Handled;
        }

        let widgets = self.widget_count();
        let response = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.move_cursor(-1, rows);
                TableResponse::Handled
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.move_cursor(1, rows);
                TableResponse::Handled
            }
            KeyCode::PageUp => {
                self.state.move_cursor(-PAGE_STEP, rows);
                TableResponse::Handled
            }
            KeyCode::PageDown => {
                self.state.move_cursor(PAGE_STEP, rows);
                TableResponse::Handled
            }
            KeyCode::Home => {
                self.state.select(0);
                TableResponse::Handled
            }
            KeyCode::End => {
                self.state.select(rows - 1);
                TableResponse::Handled
            }
            KeyCode::Left if widgets > 0 => {
                self.state.cycle_widget(-1, widgets);
                TableResponse::Handled
            }
            KeyCode::Right if widgets > 0 => {
                self.state.cycle_widget(1, widgets);
                TableResponse::Handled
            }
            KeyCode::Char(' ') | KeyCode::Enter => match self.activate() {
                Some(action) => TableResponse::Action(action),
                None => TableResponse::Ignored,
            },
            KeyCode::Esc => {
                self.state.deselect();
                TableResponse::Handled
            }
            _ => TableResponse::Ignored,
        };

        if response != TableResponse::Ignored {
            self.dirty = true;
        }
        response
    }

    /// Release the instance.
    pub fn destroy(self) {
        tracing::debug!(table = self.id, "table destroyed");
    }

    fn widget_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_widget()).count()
    }

    fn activate(&self) -> Option<CellAction> {
        let display = self.state.cursor()?;
        let index = self.data_index(display)?;
        let row = self.rows.get(index)?;
        let widget = self
            .columns
            .iter()
            .filter_map(|c| c.widget.as_ref())
            .nth(self.state.widget)?;
        Some(widget.activate(index, row))
    }

    fn matches(&self, row: &T, query: &str) -> bool {
        self.columns.iter().any(|col| {
            col.filterable
                && !col.is_widget()
                && (col.accessor)(row).to_string().to_lowercase().contains(query)
        })
    }

    fn rebuild(&mut self) {
        let mut view: Vec<usize> = match self.filter {
            Some(ref query) => (0..self.rows.len())
                .filter(|&i| self.matches(&self.rows[i], query))
                .collect(),
            None => (0..self.rows.len()).collect(),
        };

        if let Some((column, direction)) = self.sort {
            if let Some(col) = self.columns.get(column) {
                let accessor = col.accessor;
                let rows = &self.rows;
                view.sort_by(|&a, &b| {
                    let ord = accessor(&rows[a]).sort_cmp(&accessor(&rows[b]));
                    match direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    }
                });
            }
        }

        self.view = view;
    }
}

enum Slot<T> {
    Empty,
    Pending {
        columns: Vec<Column<T>>,
        rows: Vec<T>,
        options: TableOptions,
    },
    Ready(TableInstance<T>),
}

/// Container owning at most one table instance.
pub struct TableSlot<T> {
    slot: Slot<T>,
    /// Last area the slot was drawn in
    area: Option<Rect>,
}

impl<T> Default for TableSlot<T> {
    fn default() -> Self {
        Self {
            slot: Slot::Empty,
            area: None,
        }
    }
}

impl<T> TableSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a table in this container.
    pub fn create(
        &mut self,
        columns: Vec<Column<T>>,
        rows: Vec<T>,
        options: TableOptions,
    ) -> Result<Created, TableError> {
        if !matches!(self.slot, Slot::Empty) {
            tracing::warn!("table create on an occupied container");
            return Err(TableError::AlreadyCreated);
        }

        if self.area.is_some() {
            self.slot = Slot::Ready(TableInstance::new(columns, rows, options));
            Ok(Created::Ready)
        } else {
            tracing::debug!("container not drawn yet, deferring table construction");
            self.slot = Slot::Pending {
                columns,
                rows,
                options,
            };
            Ok(Created::Deferred)
        }
    }

    /// Record the area the container is drawn in, materializing a pending table.
    ///
    /// An empty area does not count as mounted.
    pub fn attach(&mut self, area: Rect) -> Option<&mut TableInstance<T>> {
        if area.is_empty() {
            return self.instance_mut();
        }
        self.area = Some(area);

        if matches!(self.slot, Slot::Pending { .. }) {
            if let Slot::Pending {
                columns,
                rows,
                options,
            } = std::mem::replace(&mut self.slot, Slot::Empty)
            {
                self.slot = Slot::Ready(TableInstance::new(columns, rows, options));
            }
        }
        self.instance_mut()
    }

    /// Drop the instance or pending construction. Returns whether anything existed.
    pub fn destroy(&mut self) -> bool {
        match std::mem::replace(&mut self.slot, Slot::Empty) {
            Slot::Ready(table) => {
                table.destroy();
                true
            }
            Slot::Pending { .. } => {
                tracing::debug!("pending table discarded");
                true
            }
            Slot::Empty => false,
        }
    }

    /// Replace rows on the instance, or on the pending construction.
    pub fn set_data(&mut self, new_rows: Vec<T>) -> Result<(), TableError> {
        match self.slot {
            Slot::Ready(ref mut table) => table.set_data(new_rows),
            Slot::Pending { ref mut rows, .. } => *rows = new_rows,
            Slot::Empty => return Err(TableError::NotCreated),
        }
        Ok(())
    }

    /// Whether an instance or pending construction exists.
    pub fn is_created(&self) -> bool {
        !matches!(self.slot, Slot::Empty)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.slot, Slot::Pending { .. })
    }

    pub fn instance(&self) -> Option<&TableInstance<T>> {
        match self.slot {
            Slot::Ready(ref table) => Some(table),
            _ => None,
        }
    }

    pub fn instance_mut(&mut self) -> Option<&mut TableInstance<T>> {
        match self.slot {
            Slot::Ready(ref mut table) => Some(table),
            _ => None,
        }
    }
}

/// Stateful widget drawing a [`TableInstance`].
pub struct TableView<'a, T> {
    block: Option<Block<'a>>,
    _marker: PhantomData<fn(&T)>,
}

impl<T> Default for TableView<'_, T> {
    fn default() -> Self {
        Self {
            block: None,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> TableView<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block wrapper.
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<T> StatefulWidget for TableView<'_, T> {
    type State = TableInstance<T>;

    fn render(self, area: Rect, buf: &mut Buffer, table: &mut Self::State) {
        // Render block if present
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width < 3 || inner.height < 1 {
            return;
        }
        table.dirty = false;

        let TableInstance {
            columns,
            rows,
            options,
            sort,
            view,
            state,
            ..
        } = table;

        let right = inner.x + inner.width;
        let widths = calculate_column_widths(columns, inner.width as usize);

        let mut top = inner.y;
        if options.show_header {
            let mut x = inner.x;
            for (i, col) in columns.iter().enumerate() {
                let width = widths.get(i).copied().unwrap_or(0);
                if width == 0 {
                    continue;
                }
                let mut header = col.header.clone();
                if let Some((sorted, direction)) = *sort {
                    if sorted == i {
                        header.push_str(match direction {
                            SortDirection::Ascending => " \u{25b2}",
                            SortDirection::Descending => " \u{25bc}",
                        });
                    }
                }
                put(buf, x, top, (x + width).min(right), &header, options.header_style);
                x = x.saturating_add(width + 1);
            }
            top += 1;
        }

        let visible_height = (inner.y + inner.height).saturating_sub(top) as usize;
        if visible_height == 0 {
            return;
        }

        if view.is_empty() {
            let msg = options.placeholder.as_str();
            let x = inner.x + inner.width.saturating_sub(msg.width() as u16) / 2;
            let y = top + (visible_height as u16) / 2;
            put(buf, x, y, right, msg, Style::default().fg(Color::DarkGray));
            return;
        }

        state.visible_rows = visible_height;
        state.clamp(view.len());
        if let Some(cursor) = state.cursor() {
            state.ensure_visible(cursor);
        }

        for row_offset in 0..visible_height {
            let display_idx = state.scroll_offset + row_offset;
            let Some(row) = view.get(display_idx).and_then(|&i| rows.get(i)) else {
                break;
            };
            let y = top + row_offset as u16;

            let is_cursor = options.selectable && state.cursor() == Some(display_idx);
            let row_style = if is_cursor {
                options.highlight_style
            } else if options.striped && row_offset % 2 == 1 {
                options.stripe_style
            } else {
                Style::default()
            };

            // Clear row background
            for col_x in inner.x..right {
                buf[(col_x, y)].set_style(row_style);
            }

            let mut x = inner.x;
            let mut widget_ordinal = 0;
            for (col_idx, col) in columns.iter().enumerate() {
                let width = widths.get(col_idx).copied().unwrap_or(0);
                if width == 0 {
                    continue;
                }

                let mut style = row_style;
                let text = match col.widget {
                    Some(ref widget) => {
                        if is_cursor && widget_ordinal == state.widget {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        widget_ordinal += 1;
                        widget.render_text(row)
                    }
                    None => {
                        let cell = (col.accessor)(row);
                        if let Some(color) = cell.color() {
                            style = style.fg(color);
                        }
                        cell.to_string()
                    }
                };
                put(buf, x, y, (x + width).min(right), &text, style);
                x = x.saturating_add(width + 1);
            }
        }

        // Scrollbar (simple)
        let row_count = view.len();
        if row_count > visible_height {
            let track = visible_height as u16;
            let thumb = ((visible_height as f32 / row_count as f32) * track as f32).max(1.0) as u16;
            let max_offset = (row_count - visible_height) as f32;
            let pos = (state.scroll_offset as f32 / max_offset * track.saturating_sub(thumb) as f32) as u16;

            for dy in 0..track {
                let ch = if dy >= pos && dy < pos + thumb {
                    '\u{2588}' // Full block
                } else {
                    '\u{2591}' // Light shade
                };
                buf[(right - 1, top + dy)].set_char(ch);
            }
        }
    }
}

fn calculate_column_widths<T>(columns: &[Column<T>], total_width: usize) -> Vec<u16> {
    let col_count = columns.len();
    if col_count == 0 {
        return vec![];
    }

    // Reserve space for separators
    let separators = col_count.saturating_sub(1);
    let available = total_width.saturating_sub(separators);

    let mut widths = vec![0u16; col_count];
    let mut remaining = available;
    let mut total_flex: u16 = 0;

    // First pass: fixed and percentage widths
    for (i, col) in columns.iter().enumerate() {
        match col.width {
            ColumnWidth::Fixed(w) => {
                widths[i] = w;
                remaining = remaining.saturating_sub(w as usize);
            }
            ColumnWidth::Percentage(p) => {
                let w = (available as f32 * p / 100.0) as u16;
                widths[i] = w;
                remaining = remaining.saturating_sub(w as usize);
            }
            ColumnWidth::Flex(f) => total_flex += f,
        }
    }

    // Second pass: distribute remaining to flex columns
    if total_flex > 0 {
        for (i, col) in columns.iter().enumerate() {
            if let ColumnWidth::Flex(f) = col.width {
                widths[i] = (remaining as f32 * f as f32 / total_flex as f32) as u16;
            }
        }
    }

    widths
}
