//! Column definitions for the table.

use super::CellContent;

/// Column width specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Fixed width in characters
    Fixed(u16),
    /// Percentage of available width
    Percentage(f32),
    /// Flexible width with relative weight
    Flex(u16),
}

impl Default for ColumnWidth {
    fn default() -> Self {
        Self::Flex(1)
    }
}

/// Interactive widget drawn in every cell of a column.
///
/// Activating a widget never touches the rows; it yields a [`CellAction`]
/// for the owner of the rows to act on.
pub enum CellWidget<T> {
    /// Checkbox reflecting a boolean on the row
    Checkbox { key: String, checked: fn(&T) -> bool },
    /// Inline button
    Button { key: String, label: String },
}

impl<T> CellWidget<T> {
    pub fn key(&self) -> &str {
        match self {
            Self::Checkbox { key, .. } | Self::Button { key, .. } => key,
        }
    }

    /// Text drawn for a row.
    pub fn render_text(&self, row: &T) -> String {
        match self {
            Self::Checkbox { checked, .. } => {
                if checked(row) { "[\u{2713}]" } else { "[ ]" }.to_string()
            }
            Self::Button { label, .. } => format!("[{label}]"),
        }
    }

    /// Build the action for activating this widget on a row.
    pub fn activate(&self, row_index: usize, row: &T) -> CellAction {
        let kind = match self {
            Self::Checkbox { checked, .. } => CellActionKind::Toggle {
                checked: !checked(row),
            },
            Self::Button { .. } => CellActionKind::Press,
        };
        CellAction {
            row: row_index,
            key: self.key().to_string(),
            kind,
        }
    }
}

/// What an activated cell widget asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellActionKind {
    /// Checkbox flipped; `checked` is the requested new state
    Toggle { checked: bool },
    /// Button pressed
    Press,
}

/// Cell widget activation handed back to the row owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAction {
    /// Index into the row vector passed to `set_data`
    pub row: usize,
    /// Action key of the column
    pub key: String,
    pub kind: CellActionKind,
}

/// Column definition for the table.
pub struct Column<T> {
    /// Header text
    pub header: String,
    /// Width specification
    pub width: ColumnWidth,
    /// Function to extract cell content from row
    pub accessor: fn(&T) -> CellContent,
    /// Interactive widget replacing the accessor's content
    pub widget: Option<CellWidget<T>>,
    /// Whether this column is sortable
    pub sortable: bool,
    /// Whether this column is filterable
    pub filterable: bool,
}

impl<T> Column<T> {
    /// Create a new column with header and accessor.
    pub fn new(header: impl Into<String>, accessor: fn(&T) -> CellContent) -> Self {
        Self {
            header: header.into(),
            width: ColumnWidth::default(),
            accessor,
            widget: None,
            sortable: false,
            filterable: true,
        }
    }

    /// Checkbox column bound to a boolean on the row.
    pub fn checkbox(header: impl Into<String>, key: impl Into<String>, checked: fn(&T) -> bool) -> Self {
        Self {
            header: header.into(),
            width: ColumnWidth::Fixed(5),
            accessor: |_| CellContent::Empty,
            widget: Some(CellWidget::Checkbox {
                key: key.into(),
                checked,
            }),
            sortable: false,
            filterable: false,
        }
    }

    /// Button column with the same label on every row.
    pub fn button(header: impl Into<String>, key: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        let width = unicode_width::UnicodeWidthStr::width(label.as_str()) as u16 + 2;
        Self {
            header: header.into(),
            width: ColumnWidth::Fixed(width),
            accessor: |_| CellContent::Empty,
            widget: Some(CellWidget::Button {
                key: key.into(),
                label,
            }),
            sortable: false,
            filterable: false,
        }
    }

    /// Set the column width.
    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    /// Set whether the column is sortable.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Set whether the column is filterable.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn is_widget(&self) -> bool {
        self.widget.is_some()
    }

    /// Display text of this column for a row.
    pub fn cell_text(&self, row: &T) -> String {
        match self.widget {
            Some(ref widget) => widget.render_text(row),
            None => (self.accessor)(row).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        carno: String,
        checked: bool,
    }

    fn row() -> Row {
        Row {
            carno: "12가3456".into(),
            checked: false,
        }
    }

    #[test]
    fn test_data_column() {
        let col = Column::new("차량번호", |r: &Row| r.carno.clone().into()).sortable(true);
        assert!(!col.is_widget());
        assert!(col.sortable);
        assert_eq!(col.cell_text(&row()), "12가3456");
    }

    #[test]
    fn test_checkbox_activation_requests_flip() {
        let col = Column::checkbox("선택", "select", |r: &Row| r.checked);
        assert!(!col.filterable);
        assert_eq!(col.cell_text(&row()), "[ ]");

        let widget = col.widget.as_ref().unwrap();
        let action = widget.activate(3, &row());
        assert_eq!(
            action,
            CellAction {
                row: 3,
                key: "select".into(),
                kind: CellActionKind::Toggle { checked: true },
            }
        );
    }

    #[test]
    fn test_button_column() {
        let col: Column<Row> = Column::button("상세", "detail", "상세");
        // Two Hangul syllables plus brackets.
        assert_eq!(col.width, ColumnWidth::Fixed(6));
        assert_eq!(col.cell_text(&row()), "[상세]");
        let action = col.widget.as_ref().unwrap().activate(0, &row());
        assert_eq!(action.kind, CellActionKind::Press);
        assert_eq!(action.key, "detail");
    }
}
