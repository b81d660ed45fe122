//! Cell content types for the table.

use ratatui::style::Color;
use std::cmp::Ordering;
use std::fmt;

/// Content that can be displayed in a table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Plain text
    Text(String),
    /// Numeric value (for sorting)
    Number(f64),
    /// Badge with label and color
    Badge { label: String, color: Color },
    /// Nothing to show
    Empty,
}

impl CellContent {
    /// Create a text cell.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create a number cell.
    pub fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// Create a badge cell.
    pub fn badge(label: impl Into<String>, color: Color) -> Self {
        Self::Badge {
            label: label.into(),
            color,
        }
    }

    /// Text cell from an optional backend value, empty when missing.
    pub fn opt_text(s: Option<&str>) -> Self {
        match s {
            Some(s) if !s.is_empty() => Self::Text(s.to_string()),
            _ => Self::Empty,
        }
    }

    /// Foreground color override, if any.
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Badge { color, .. } => Some(*color),
            _ => None,
        }
    }

    /// Sort order: missing values first, then numbers, then case-insensitive text.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }

    fn sort_key(&self) -> SortKey {
        match self {
            Self::Text(s) => SortKey::Text(s.to_lowercase()),
            Self::Number(n) => SortKey::Number(*n),
            Self::Badge { label, .. } => SortKey::Text(label.to_lowercase()),
            Self::Empty => SortKey::Missing,
        }
    }
}

#[derive(Debug, PartialEq)]
enum SortKey {
    Missing,
    Number(f64),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for SortKey {}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for CellContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{:.2}", n)
                }
            }
            Self::Badge { label, .. } => write!(f, "{}", label),
            Self::Empty => Ok(()),
        }
    }
}

impl From<String> for CellContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for CellContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for CellContent {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellContent {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u32> for CellContent {
    fn from(n: u32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<Option<String>> for CellContent {
    fn from(s: Option<String>) -> Self {
        s.map(Self::Text).unwrap_or(Self::Empty)
    }
}
