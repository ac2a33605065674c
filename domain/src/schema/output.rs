//! Output contract compiler
//!
//! [`OutputContract::compile`] turns a [`SchemaContract`] into the fixed
//! per-field response shape every backend must honor. It runs once per
//! session; the resulting contract provides:
//!
//! - a JSON Schema used as the structured-output constraint on the request
//! - a validator that turns a raw backend answer into [`FieldRecords`]
//!
//! Every field entry has the shape:
//!
//! ```json
//! {
//!   "value": 531,
//!   "confidence": "high",
//!   "source_location": {
//!     "page": 4,
//!     "section": "Methods",
//!     "specific_location": "Table 1",
//!     "exact_text_reference": "A total of 531 patients were randomized"
//!   },
//!   "notes": null
//! }
//! ```

use super::contract::SchemaContract;
use super::field::{Field, ValueKind};
use crate::core::error::DomainError;
use crate::extraction::record::{
    Confidence, FieldRecord, FieldRecords, FieldValue, SourceLocation,
};
use serde_json::{Map, Value, json};

/// Compiled response shape for one schema
#[derive(Debug, Clone)]
pub struct OutputContract {
    schema: SchemaContract,
    json_schema: Value,
    openapi_schema: Value,
}

impl OutputContract {
    /// Compile the response shape for a schema
    pub fn compile(schema: &SchemaContract) -> Self {
        Self {
            schema: schema.clone(),
            json_schema: build_schema(schema, SchemaDialect::JsonSchema),
            openapi_schema: build_schema(schema, SchemaDialect::OpenApi),
        }
    }

    pub fn schema(&self) -> &SchemaContract {
        &self.schema
    }

    /// Strict JSON Schema (nullable types as `["type", "null"]`)
    pub fn json_schema(&self) -> &Value {
        &self.json_schema
    }

    /// OpenAPI-subset schema (nullable types as `nullable: true`)
    pub fn openapi_schema(&self) -> &Value {
        &self.openapi_schema
    }

    /// Validate a raw backend answer against the contract
    ///
    /// The answer may be wrapped in a Markdown code fence or surrounded by
    /// prose. The decoded object must contain exactly the schema's fields,
    /// each with all required sub-parts.
    pub fn validate(&self, raw: &str) -> Result<FieldRecords, DomainError> {
        let body = extract_json(raw);
        let parsed: Value = serde_json::from_str(body)
            .map_err(|e| malformed(format!("response is not valid JSON: {}", e)))?;
        self.validate_value(&parsed)
    }

    /// Check already-built records against the contract
    ///
    /// The key set must equal the schema's field names and every non-empty
    /// value must carry an exact text reference.
    pub fn check_records(&self, records: &FieldRecords) -> Result<(), DomainError> {
        if let Some(extra) = records.keys().find(|k| !self.schema.contains(k)) {
            return Err(malformed(format!("unexpected field: {}", extra)));
        }
        for name in self.schema.field_names() {
            let record = records
                .get(name)
                .ok_or_else(|| malformed(format!("missing field: {}", name)))?;
            if !record.has_provenance() {
                return Err(malformed(format!(
                    "{}: value without exact_text_reference",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Validate an already-decoded answer against the contract
    pub fn validate_value(&self, answer: &Value) -> Result<FieldRecords, DomainError> {
        let object = answer
            .as_object()
            .ok_or_else(|| malformed("response is not a JSON object"))?;

        if let Some(extra) = object.keys().find(|k| !self.schema.contains(k)) {
            return Err(malformed(format!("unexpected field: {}", extra)));
        }

        let mut records = FieldRecords::new();
        for field in self.schema.fields() {
            let entry = object
                .get(&field.name)
                .ok_or_else(|| malformed(format!("missing field: {}", field.name)))?;
            records.insert(field.name.clone(), parse_record(field, entry)?);
        }

        Ok(records)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum SchemaDialect {
    JsonSchema,
    OpenApi,
}

fn build_schema(schema: &SchemaContract, dialect: SchemaDialect) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in schema.fields() {
        properties.insert(field.name.clone(), field_schema(field, dialect));
        required.push(json!(field.name));
    }

    object_schema(properties, required, dialect)
}

fn field_schema(field: &Field, dialect: SchemaDialect) -> Value {
    let mut description = field.label.clone();
    if !field.description.is_empty() {
        description.push_str(": ");
        description.push_str(&field.description);
    }

    let mut value = nullable(field.value_kind.json_type(), dialect);
    if let Value::Object(map) = &mut value {
        map.insert("description".to_string(), json!(description));
    }

    let mut location = Map::new();
    location.insert("page".to_string(), json!({ "type": "integer" }));
    location.insert("section".to_string(), nullable("string", dialect));
    location.insert("specific_location".to_string(), nullable("string", dialect));
    location.insert(
        "exact_text_reference".to_string(),
        json!({ "type": "string" }),
    );
    let location_required = vec![
        json!("page"),
        json!("section"),
        json!("specific_location"),
        json!("exact_text_reference"),
    ];

    let mut properties = Map::new();
    properties.insert("value".to_string(), value);
    properties.insert(
        "confidence".to_string(),
        json!({ "type": "string", "enum": ["high", "medium", "low"] }),
    );
    properties.insert(
        "source_location".to_string(),
        object_schema(location, location_required, dialect),
    );
    properties.insert("notes".to_string(), nullable("string", dialect));

    let required = vec![
        json!("value"),
        json!("confidence"),
        json!("source_location"),
        json!("notes"),
    ];

    object_schema(properties, required, dialect)
}

fn object_schema(properties: Map<String, Value>, required: Vec<Value>, dialect: SchemaDialect) -> Value {
    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "required": required,
    });
    if dialect == SchemaDialect::JsonSchema
        && let Value::Object(map) = &mut schema
    {
        map.insert("additionalProperties".to_string(), json!(false));
    }
    schema
}

fn nullable(json_type: &str, dialect: SchemaDialect) -> Value {
    match dialect {
        SchemaDialect::JsonSchema => json!({ "type": [json_type, "null"] }),
        SchemaDialect::OpenApi => json!({ "type": json_type, "nullable": true }),
    }
}

/// Strip a surrounding Markdown code fence (```json ... ```), if any
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json") on the opening line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    match rest.find("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

/// Locate the JSON object in a backend answer
///
/// Tries, in order: a leading code fence, a fenced block after some prose,
/// then the span from the first `{` to the last `}`.
pub fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with("```") || trimmed.starts_with('{') {
        return strip_code_fence(trimmed);
    }

    if let Some(start) = trimmed.find("\n```") {
        let fenced = strip_code_fence(&trimmed[start + 1..]);
        if fenced.starts_with('{') {
            return fenced;
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn malformed(reason: impl Into<String>) -> DomainError {
    DomainError::MalformedOutput(reason.into())
}

fn parse_record(field: &Field, entry: &Value) -> Result<FieldRecord, DomainError> {
    let object = entry
        .as_object()
        .ok_or_else(|| malformed(format!("{}: entry is not an object", field.name)))?;

    let raw_value = object
        .get("value")
        .ok_or_else(|| malformed(format!("{}: missing value", field.name)))?;
    let value = coerce_value(field, raw_value)?;

    let confidence: Confidence = object
        .get("confidence")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("{}: missing confidence", field.name)))?
        .parse()?;

    let location = object
        .get("source_location")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed(format!("{}: missing source_location", field.name)))?;
    let source_location = parse_location(field, location)?;

    if !value.is_empty() && source_location.exact_text_reference.trim().is_empty() {
        return Err(malformed(format!(
            "{}: value without exact_text_reference",
            field.name
        )));
    }

    let notes = optional_string(object.get("notes"));

    Ok(FieldRecord {
        value,
        confidence,
        source_location,
        notes,
    })
}

fn parse_location(field: &Field, location: &Map<String, Value>) -> Result<SourceLocation, DomainError> {
    let page = match location.get("page") {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64)
                    .map(|f| f as u64)
            })
            .and_then(|page| u32::try_from(page).ok())
            .ok_or_else(|| malformed(format!("{}: invalid page {}", field.name, n)))?,
        Some(Value::String(s)) if s.trim().is_empty() => 0,
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| malformed(format!("{}: invalid page {}", field.name, s)))?,
        Some(other) => {
            return Err(malformed(format!("{}: invalid page {}", field.name, other)));
        }
    };

    Ok(SourceLocation {
        page,
        section: optional_string(location.get("section")),
        specific_location: optional_string(location.get("specific_location")),
        exact_text_reference: optional_string(location.get("exact_text_reference"))
            .unwrap_or_default(),
    })
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn coerce_value(field: &Field, raw: &Value) -> Result<FieldValue, DomainError> {
    let invalid = || {
        malformed(format!(
            "{}: {} is not a valid {} value",
            field.name, raw, field.value_kind
        ))
    };

    let value = match (field.value_kind, raw) {
        (_, Value::Null) => FieldValue::Empty,
        (_, Value::String(s)) if s.trim().is_empty() => FieldValue::Empty,

        (ValueKind::Text | ValueKind::LongText, Value::String(s)) => FieldValue::text(s.clone()),
        (ValueKind::Text | ValueKind::LongText, Value::Number(n)) => FieldValue::Text(n.to_string()),
        (ValueKind::Text | ValueKind::LongText, Value::Bool(b)) => FieldValue::Text(b.to_string()),

        (ValueKind::Integer, Value::Number(n)) => match n.as_i64() {
            Some(i) => FieldValue::Integer(i),
            // 2^63 is exactly representable, so `<` keeps the cast in range
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| FieldValue::Integer(f as i64))
                .ok_or_else(invalid)?,
        },
        (ValueKind::Integer, Value::String(s)) => s
            .trim()
            .replace(',', "")
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| invalid())?,

        (ValueKind::Decimal, Value::Number(n)) => {
            FieldValue::Decimal(n.as_f64().ok_or_else(invalid)?)
        }
        // NaN and infinities have no JSON form and would not read back
        (ValueKind::Decimal, Value::String(s)) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(FieldValue::Decimal)
            .ok_or_else(invalid)?,

        (ValueKind::Boolean, Value::Bool(b)) => FieldValue::Boolean(*b),
        (ValueKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => FieldValue::Boolean(true),
            "false" | "no" => FieldValue::Boolean(false),
            _ => return Err(invalid()),
        },

        _ => return Err(invalid()),
    };

    Ok(value)
}
