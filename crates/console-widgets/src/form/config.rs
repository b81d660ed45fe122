//! Area configuration: the tree of search and button areas.

use super::descriptor::{FieldDescriptor, FieldKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while loading or validating an area configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate field id: {0}")]
    DuplicateId(String),

    #[error("Field {0} needs at least one option")]
    MissingOptions(String),

    #[error("Field {0} needs an eventType")]
    MissingEventType(String),

    #[error("Field {0} has row 0; rows start at 1")]
    InvalidRow(String),

    #[error("Field {field} is paired with unknown field {pair}")]
    UnknownPair { field: String, pair: String },

    #[error("Field {field} has an invalid pattern: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("Field {field} has a defaultValue of the wrong shape for {kind:?}")]
    DefaultShape { field: String, kind: FieldKind },
}

/// Kind of area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    Search,
    Buttons,
}

/// A named group of field descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    #[serde(rename = "type")]
    pub area_type: AreaType,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl Area {
    pub fn search(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            area_type: AreaType::Search,
            fields,
        }
    }

    pub fn buttons(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            area_type: AreaType::Buttons,
            fields,
        }
    }
}

/// Declarative configuration of a search form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaConfiguration {
    pub areas: Vec<Area>,
}

impl AreaConfiguration {
    pub fn new(areas: Vec<Area>) -> Self {
        Self { areas }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the structural invariants of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for field in self.fields() {
            if !seen.insert(field.id.as_str()) {
                return Err(ConfigError::DuplicateId(field.id.clone()));
            }
            if field.row == 0 {
                return Err(ConfigError::InvalidRow(field.id.clone()));
            }
            if field.kind.needs_options() && field.options.is_empty() {
                return Err(ConfigError::MissingOptions(field.id.clone()));
            }
            if field.kind.needs_event_type() && field.event_type.is_none() {
                return Err(ConfigError::MissingEventType(field.id.clone()));
            }
            if field.default_value.as_ref().is_some_and(|v| !field.kind.accepts(v)) {
                return Err(ConfigError::DefaultShape {
                    field: field.id.clone(),
                    kind: field.kind,
                });
            }
            if let Some(ref pattern) = field.pattern {
                regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    field: field.id.clone(),
                    reason: e.to_string(),
                })?;
            }
        }

        // Only explicit pairs must resolve; well-known ids may stand alone.
        for field in self.fields() {
            if let Some(ref pair) = field.pair {
                if self.field(pair).is_none() {
                    return Err(ConfigError::UnknownPair {
                        field: field.id.clone(),
                        pair: pair.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// First area of the given type.
    pub fn area(&self, area_type: AreaType) -> Option<&Area> {
        self.areas.iter().find(|a| a.area_type == area_type)
    }

    pub fn search_area(&self) -> Option<&Area> {
        self.area(AreaType::Search)
    }

    pub fn button_area(&self) -> Option<&Area> {
        self.area(AreaType::Buttons)
    }

    /// All fields across every area, in configuration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.areas.iter().flat_map(|a| a.fields.iter())
    }

    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut FieldDescriptor> {
        self.areas
            .iter_mut()
            .flat_map(|a| a.fields.iter_mut())
            .find(|f| f.id == id)
    }

    /// Toggle a field's enablement. Returns false for unknown ids.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.field_mut(id) {
            Some(field) => {
                field.enabled = enabled;
                true
            }
            None => false,
        }
    }
}
