//! Events a form dispatches to its owner.
//!
//! Configurations name events with plain strings so they stay data. Each
//! screen decodes those names into its own closed enum via [`ScreenEvent`].

use super::value::FilterValue;
use serde::{Deserialize, Serialize};

/// Event names dispatched by the built-in kinds.
pub mod names {
    pub const SELECT_CHANGE: &str = "selectChange";
    pub const RADIO_CHANGE: &str = "radioChange";
    pub const CHECKBOX_CHANGE: &str = "checkboxChange";
    pub const DATE_CHANGE: &str = "dateChange";
}

/// Payload of a dispatched event. `id` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl EventPayload {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: None,
            checked: None,
        }
    }

    pub fn with_value(id: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            id: id.into(),
            value: Some(value.into()),
            checked: None,
        }
    }

    pub fn with_checked(id: impl Into<String>, checked: bool) -> Self {
        Self {
            id: id.into(),
            value: None,
            checked: Some(checked),
        }
    }

    /// String value carried by the event, or `""`.
    pub fn text(&self) -> &str {
        self.value.as_ref().map(FilterValue::as_str).unwrap_or("")
    }
}

/// A dispatched `(event_type, payload)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub event_type: String,
    pub payload: EventPayload,
}

impl Dispatch {
    pub fn new(event_type: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

/// Closed set of events one screen understands.
pub trait ScreenEvent: Sized {
    /// Map a dispatched event onto the screen's enum; `None` for names it does not handle.
    fn decode(event_type: &str, payload: &EventPayload) -> Option<Self>;

    /// Decode, logging names the screen does not know.
    fn decode_or_log(event_type: &str, payload: &EventPayload) -> Option<Self> {
        let decoded = Self::decode(event_type, payload);
        if decoded.is_none() {
            tracing::warn!(event_type, id = %payload.id, "unhandled form event");
        }
        decoded
    }
}
