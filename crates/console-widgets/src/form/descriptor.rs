//! Field descriptors: the declarative description of one form control.

use super::value::FilterValue;
use ratatui::style::{Color, Style};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default `maxLength` for text-like kinds.
pub const DEFAULT_MAX_LENGTH: usize = 255;

/// Fallback width of an input cell, in terminal columns.
pub const DEFAULT_WIDTH: u16 = 18;

/// Fallback height of an input cell, in terminal rows.
pub const DEFAULT_HEIGHT: u16 = 1;

/// Paired ids reset and constrained together without an explicit `pair`.
const WELL_KNOWN_PAIRS: [(&str, &str); 2] = [
    ("rangeStartDate", "rangeEndDate"),
    ("rangeStartMonth", "rangeEndMonth"),
];

/// Kind of form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Day,
    Startday,
    Endday,
    Month,
    Startmonth,
    Endmonth,
    Dayperiod,
    Monthperiod,
    #[serde(rename = "popupIcon")]
    PopupIcon,
    Button,
    Label,
}

impl FieldKind {
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::Textarea)
    }

    /// Single-value day kinds.
    pub fn is_day(self) -> bool {
        matches!(self, Self::Day | Self::Startday | Self::Endday)
    }

    /// Single-value month kinds.
    pub fn is_month(self) -> bool {
        matches!(self, Self::Month | Self::Startmonth | Self::Endmonth)
    }

    pub fn is_period(self) -> bool {
        matches!(self, Self::Dayperiod | Self::Monthperiod)
    }

    /// Any kind holding a date or month, single or period.
    pub fn is_dated(self) -> bool {
        self.is_day() || self.is_month() || self.is_period()
    }

    pub fn is_start(self) -> bool {
        matches!(self, Self::Startday | Self::Startmonth)
    }

    pub fn is_end(self) -> bool {
        matches!(self, Self::Endday | Self::Endmonth)
    }

    /// Whether the kind resolves to month precision (`YYYY-MM`).
    pub fn month_precision(self) -> bool {
        self.is_month() || self == Self::Monthperiod
    }

    pub fn needs_options(self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }

    pub fn needs_event_type(self) -> bool {
        matches!(self, Self::PopupIcon | Self::Button)
    }

    /// Whether the control can take focus.
    pub fn is_interactive(self) -> bool {
        self != Self::Label
    }

    /// Whether a value of this shape can seed the field: periods take
    /// `{start,end}`, checkboxes a bool, everything else text.
    pub fn accepts(self, value: &FilterValue) -> bool {
        match value {
            FilterValue::Period(_) => self.is_period(),
            FilterValue::Bool(_) => self == Self::Checkbox,
            FilterValue::Text(_) => !self.is_period() && self != Self::Checkbox,
        }
    }
}

/// One `{value, label}` entry of a select or radio group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declarative description of one form control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Key into the filter state
    pub id: String,
    pub kind: FieldKind,
    /// Display row; fields sharing a row render together
    #[serde(default = "default_row")]
    pub row: u32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub label_visible: bool,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub width: Option<u16>,
    #[serde(default)]
    pub height: Option<u16>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub default_value: Option<FilterValue>,
    /// Event dispatched by buttons and popup icons
    #[serde(default)]
    pub event_type: Option<String>,
    /// Overrides the event name a value-carrying kind dispatches
    #[serde(default)]
    pub event: Option<String>,
    /// Id of the mutually constrained start/end partner
    #[serde(default)]
    pub pair: Option<String>,
    #[serde(default)]
    pub reset_when_disabled: bool,
    /// Mask the value when drawn
    #[serde(default)]
    pub secret: bool,
}

fn default_row() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl FieldDescriptor {
    /// Create a new field.
    pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            kind,
            row: 1,
            label: None,
            label_visible: true,
            options: Vec::new(),
            placeholder: None,
            max_length: None,
            pattern: None,
            width: None,
            height: None,
            background_color: None,
            color: None,
            enabled: true,
            default_value: None,
            event_type: None,
            event: None,
            pair: None,
            reset_when_disabled: false,
            secret: false,
        }
    }

    pub fn row(mut self, row: u32) -> Self {
        self.row = row;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn hide_label(mut self) -> Self {
        self.label_visible = false;
        self
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption::new(value, label));
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn colors(mut self, fg: impl Into<String>, bg: impl Into<String>) -> Self {
        self.color = Some(fg.into());
        self.background_color = Some(bg.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn default_value(mut self, value: impl Into<FilterValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn event_type(mut self, name: impl Into<String>) -> Self {
        self.event_type = Some(name.into());
        self
    }

    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.event = Some(name.into());
        self
    }

    pub fn pair(mut self, id: impl Into<String>) -> Self {
        self.pair = Some(id.into());
        self
    }

    pub fn reset_when_disabled(mut self, allowed: bool) -> Self {
        self.reset_when_disabled = allowed;
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Effective length limit: explicit, or the default for text-like kinds.
    pub fn effective_max_length(&self) -> Option<usize> {
        match self.max_length {
            Some(max) => Some(max),
            None if self.kind.is_text() => Some(DEFAULT_MAX_LENGTH),
            None => None,
        }
    }

    /// Id of the partner field, explicit or well-known.
    pub fn paired_id(&self) -> Option<&str> {
        if let Some(ref pair) = self.pair {
            return Some(pair);
        }
        WELL_KNOWN_PAIRS.iter().find_map(|(start, end)| {
            if self.id == *start {
                Some(*end)
            } else if self.id == *end {
                Some(*start)
            } else {
                None
            }
        })
    }

    /// Label text, falling back to the id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    pub fn cell_width(&self) -> u16 {
        self.width.unwrap_or(DEFAULT_WIDTH)
    }

    pub fn cell_height(&self) -> u16 {
        self.height.unwrap_or(DEFAULT_HEIGHT).max(1)
    }

    /// Resolved input style. Unparseable colors fall back to the terminal default.
    pub fn style(&self) -> Style {
        let mut style = Style::default();
        if let Some(fg) = self.color.as_deref().and_then(parse_color) {
            style = style.fg(fg);
        }
        if let Some(bg) = self.background_color.as_deref().and_then(parse_color) {
            style = style.bg(bg);
        }
        style
    }
}

fn parse_color(s: &str) -> Option<Color> {
    Color::from_str(s).ok()
}
