//! Field Record value objects
//!
//! A [`FieldRecord`] is one provider's answer for one field: the value,
//! how confident the provider is, and where in the document it came from.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-field answers of one provider, keyed by field name
pub type FieldRecords = BTreeMap<String, FieldRecord>;

/// An extracted value
///
/// Serializes to the bare JSON value (`null`, bool, number, string) so that
/// values round-trip exactly: an integer stays an integer and a decimal stays
/// a decimal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No answer
    #[default]
    Empty,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    /// Build a text value; blank text is treated as no answer
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Empty => write!(f, "-"),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Decimal(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Provider-reported confidence in a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Confidence {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            other => Err(DomainError::MalformedOutput(format!(
                "unknown confidence level: {}",
                other
            ))),
        }
    }
}

/// Provenance of a value inside the document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// 1-based page number (0 when unknown)
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_location: Option<String>,
    /// Verbatim quote backing the value
    #[serde(default)]
    pub exact_text_reference: String,
}

impl SourceLocation {
    pub fn new(page: u32, exact_text_reference: impl Into<String>) -> Self {
        Self {
            page,
            section: None,
            specific_location: None,
            exact_text_reference: exact_text_reference.into(),
        }
    }
}

/// One provider's answer for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub value: FieldValue,
    pub confidence: Confidence,
    pub source_location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl FieldRecord {
    /// A value backed by a source location
    pub fn found(value: FieldValue, confidence: Confidence, source: SourceLocation) -> Self {
        Self {
            value,
            confidence,
            source_location: source,
            notes: None,
        }
    }

    /// The backend could not determine the field
    pub fn not_found(note: impl Into<String>) -> Self {
        Self {
            value: FieldValue::Empty,
            confidence: Confidence::Low,
            source_location: SourceLocation::default(),
            notes: Some(note.into()),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Check the provenance invariant: a non-empty value needs a quote
    pub fn has_provenance(&self) -> bool {
        self.is_empty() || !self.source_location.exact_text_reference.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_empty() {
        assert_eq!(FieldValue::text("   "), FieldValue::Empty);
        assert!(FieldValue::Text(" ".to_string()).is_empty());
        assert!(!FieldValue::Integer(0).is_empty());
        assert!(!FieldValue::Boolean(false).is_empty());
    }

    #[test]
    fn test_value_serialization_keeps_number_kind() {
        let json = serde_json::to_string(&FieldValue::Integer(531)).unwrap();
        assert_eq!(json, "531");
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FieldValue::Integer(531));

        let back: FieldValue = serde_json::from_str("531.0").unwrap();
        assert_eq!(back, FieldValue::Decimal(531.0));

        let back: FieldValue = serde_json::from_str("null").unwrap();
        assert_eq!(back, FieldValue::Empty);
    }

    #[test]
    fn test_confidence_parse() {
        assert_eq!("HIGH".parse::<Confidence>().unwrap(), Confidence::High);
        assert!("certain".parse::<Confidence>().is_err());
    }

    #[test]
    fn test_provenance_invariant() {
        let record = FieldRecord::found(
            FieldValue::Integer(531),
            Confidence::High,
            SourceLocation::new(4, ""),
        );
        assert!(!record.has_provenance());

        let record = FieldRecord::not_found("not reported");
        assert!(record.has_provenance());
        assert_eq!(record.confidence, Confidence::Low);
    }
}
