//! Field definitions for the Schema Contract

use serde::{Deserialize, Serialize};

/// Kind of value a field asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    #[default]
    Text,
    LongText,
    Integer,
    Decimal,
    Boolean,
}

impl ValueKind {
    pub fn as_str(&self) -> &str {
        match self {
            ValueKind::Text => "text",
            ValueKind::LongText => "long_text",
            ValueKind::Integer => "integer",
            ValueKind::Decimal => "decimal",
            ValueKind::Boolean => "boolean",
        }
    }

    /// JSON Schema type name used in the structured-output constraint
    pub fn json_type(&self) -> &'static str {
        match self {
            ValueKind::Text | ValueKind::LongText => "string",
            ValueKind::Integer => "integer",
            ValueKind::Decimal => "number",
            ValueKind::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single requested field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Unique machine name (e.g., "sample_size")
    pub name: String,
    /// Human-readable label
    #[serde(default)]
    pub label: String,
    /// Expected kind of value
    #[serde(default, alias = "type")]
    pub value_kind: ValueKind,
    /// Guidance for the extraction backend
    #[serde(default)]
    pub description: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value_kind: ValueKind) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            value_kind,
            description: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
