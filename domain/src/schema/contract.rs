//! Schema Contract value object

use super::field::Field;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, validated list of requested fields (Value Object)
///
/// Immutable once built: every agent call of a session receives the same
/// contract.
///
/// # Example
///
/// ```
/// use extract_domain::schema::{Field, SchemaContract, ValueKind};
///
/// let schema = SchemaContract::new(vec![
///     Field::new("sample_size", ValueKind::Integer),
///     Field::new("primary_outcome", ValueKind::LongText),
/// ])
/// .unwrap();
///
/// assert_eq!(schema.len(), 2);
/// assert!(schema.contains("sample_size"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaContract {
    fields: Vec<Field>,
}

impl SchemaContract {
    /// Build a contract, validating non-empty and unique field names
    pub fn new(fields: Vec<Field>) -> Result<Self, DomainError> {
        if fields.is_empty() {
            return Err(DomainError::EmptySchema);
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.trim().is_empty() {
                return Err(DomainError::EmptyFieldName);
            }
            if !seen.insert(field.name.as_str()) {
                return Err(DomainError::DuplicateField(field.name.clone()));
            }
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Field names in schema order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'de> Deserialize<'de> for SchemaContract {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            fields: Vec<Field>,
        }

        let raw = Raw::deserialize(deserializer)?;
        SchemaContract::new(raw.fields).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValueKind;

    #[test]
    fn test_empty_schema_rejected() {
        assert_eq!(SchemaContract::new(vec![]), Err(DomainError::EmptySchema));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = SchemaContract::new(vec![
            Field::new("arm", ValueKind::Text),
            Field::new("arm", ValueKind::Integer),
        ]);
        assert_eq!(result, Err(DomainError::DuplicateField("arm".to_string())));
    }

    #[test]
    fn test_blank_field_name_rejected() {
        let result = SchemaContract::new(vec![Field::new("  ", ValueKind::Text)]);
        assert_eq!(result, Err(DomainError::EmptyFieldName));
    }

    #[test]
    fn test_field_order_preserved() {
        let schema = SchemaContract::new(vec![
            Field::new("b", ValueKind::Text),
            Field::new("a", ValueKind::Boolean),
        ])
        .unwrap();

        let names: Vec<_> = schema.field_names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"fields": [{"name": "x", "value_kind": "decimal"}, {"name": "x"}]}"#;
        let result: Result<SchemaContract, _> = serde_json::from_str(json);
        assert!(result.is_err());

        let json = r#"{"fields": [{"name": "x", "type": "decimal", "label": "X"}]}"#;
        let schema: SchemaContract = serde_json::from_str(json).unwrap();
        assert_eq!(schema.fields()[0].value_kind, ValueKind::Decimal);
    }
}
