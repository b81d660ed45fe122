//! Filter values and the filter-state mapping backing a search form.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A `{start, end}` pair held by period fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: String,
    pub end: String,
}

impl Period {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Both sides set to the same value.
    pub fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            start: value.clone(),
            end: value,
        }
    }
}

/// Value of a single filter key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean value (checkboxes)
    Bool(bool),
    /// Start/end pair (period kinds)
    Period(Period),
    /// String value
    Text(String),
}

impl Default for FilterValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl FilterValue {
    /// Get as string, or empty string if not a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) => s,
            _ => "",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_period(&self) -> Option<&Period> {
        match self {
            Self::Period(p) => Some(p),
            _ => None,
        }
    }

    /// Check if the value is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Period(p) => p.start.is_empty() && p.end.is_empty(),
            Self::Bool(_) => false,
        }
    }

    /// Text shown in a form cell.
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(b) => if *b { "[\u{2713}]" } else { "[ ]" }.to_string(),
            Self::Period(p) => format!("{} ~ {}", p.start, p.end),
        }
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Period> for FilterValue {
    fn from(p: Period) -> Self {
        Self::Period(p)
    }
}

/// Flat mapping from field id to current value.
///
/// Owned by the page controller. Forms only read it; changes come back to the
/// owner as a [`FilterPatch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    values: HashMap<String, FilterValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&FilterValue> {
        self.values.get(id)
    }

    /// String value of a key, or `""` when absent or not a string.
    pub fn text(&self, id: &str) -> &str {
        self.values.get(id).map(FilterValue::as_str).unwrap_or("")
    }

    pub fn flag(&self, id: &str) -> bool {
        self.values
            .get(id)
            .and_then(FilterValue::as_bool)
            .unwrap_or(false)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<FilterValue>) {
        self.values.insert(id.into(), value.into());
    }

    /// Insert only when the key is absent. Returns whether it was inserted.
    pub fn set_if_absent(&mut self, id: &str, value: FilterValue) -> bool {
        if self.values.contains_key(id) {
            return false;
        }
        self.values.insert(id.to_string(), value);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<FilterValue> {
        self.values.remove(id)
    }

    pub fn apply(&mut self, patch: FilterPatch) {
        for (id, value) in patch.changes {
            self.values.insert(id, value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// JSON object used as request parameters.
    pub fn to_params(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Ordered set of changes produced by one interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    changes: Vec<(String, FilterValue)>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new().with(id, value)
    }

    pub fn with(mut self, id: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.changes.push((id.into(), value.into()));
        self
    }

    pub fn changes(&self) -> &[(String, FilterValue)] {
        &self.changes
    }

    pub fn get(&self, id: &str) -> Option<&FilterValue> {
        self.changes.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_values() {
        let mut state = FilterState::new();

        state.set("carno", "12가3456");
        assert_eq!(state.text("carno"), "12가3456");

        state.set("includeReturned", true);
        assert!(state.flag("includeReturned"));
        assert_eq!(state.text("includeReturned"), "");
    }

    #[test]
    fn test_set_if_absent_keeps_existing() {
        let mut state = FilterState::new();
        state.set("mgmtstatus", "운행");

        assert!(!state.set_if_absent("mgmtstatus", "".into()));
        assert_eq!(state.text("mgmtstatus"), "운행");
        assert!(state.set_if_absent("carno", "".into()));
    }

    #[test]
    fn test_apply_patch() {
        let mut state = FilterState::new();
        let patch = FilterPatch::new()
            .with("rangeStartDate", "2024-01-01")
            .with("rangeEndDate", "2024-01-31");

        state.apply(patch);
        assert_eq!(state.text("rangeStartDate"), "2024-01-01");
        assert_eq!(state.text("rangeEndDate"), "2024-01-31");
    }

    #[test]
    fn test_untagged_serde() {
        let v: FilterValue = serde_json::from_str(r#"{"start":"2024-01","end":"2024-03"}"#).unwrap();
        assert_eq!(v, FilterValue::Period(Period::new("2024-01", "2024-03")));

        let v: FilterValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, FilterValue::Bool(true));

        let v: FilterValue = serde_json::from_str(r#""운행""#).unwrap();
        assert_eq!(v, FilterValue::Text("운행".into()));
    }

    #[test]
    fn test_to_params() {
        let mut state = FilterState::new();
        state.set("carno", "1234");
        state.set("period", Period::new("2024-01-01", "2024-01-31"));

        let params = state.to_params();
        assert_eq!(params["carno"], "1234");
        assert_eq!(params["period"]["end"], "2024-01-31");
    }
}
