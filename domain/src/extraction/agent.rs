//! Agent Extraction entity
//!
//! One record per (session, provider). The record is reused when the same
//! provider is launched again for the session; every launch is a fresh
//! attempt whose status only ever moves forward:
//!
//! ```text
//! Pending ──start──▶ Extracting ──complete──▶ Completed
//!                        │
//!                        └──────fail──────▶ Failed
//! ```

use super::record::FieldRecords;
use crate::core::error::DomainError;
use crate::core::provider::ProviderId;
use crate::schema::SchemaContract;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an Agent Extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Pending,
    Extracting,
    Completed,
    Failed,
}

impl AgentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AgentStatus::Pending => "pending",
            AgentStatus::Extracting => "extracting",
            AgentStatus::Completed => "completed",
            AgentStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentStatus::Completed | AgentStatus::Failed)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why an extraction backend could not produce a structured answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterErrorKind {
    Timeout,
    AuthFailure,
    RateLimited,
    MalformedOutput,
    TransportError,
    Unknown,
}

impl AdapterErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            AdapterErrorKind::Timeout => "timeout",
            AdapterErrorKind::AuthFailure => "auth_failure",
            AdapterErrorKind::RateLimited => "rate_limited",
            AdapterErrorKind::MalformedOutput => "malformed_output",
            AdapterErrorKind::TransportError => "transport_error",
            AdapterErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AdapterErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One provider's extraction for one session (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentExtraction {
    pub provider: ProviderId,
    pub model_name: String,
    pub status: AgentStatus,
    /// Field records, populated only on completion
    #[serde(default)]
    pub extracted_fields: FieldRecords,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<AdapterErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Attempt start (milliseconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<u64>,
    /// Attempt end (milliseconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<u64>,
    /// Wall-clock processing time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    /// Number of launches of this record (1-indexed once started)
    #[serde(default)]
    pub attempt: u32,
    /// Statuses visited during the current attempt
    #[serde(default)]
    pub history: Vec<AgentStatus>,
}

impl AgentExtraction {
    /// Create a pending record
    pub fn new(provider: ProviderId, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            status: AgentStatus::Pending,
            extracted_fields: FieldRecords::new(),
            error_kind: None,
            error_message: None,
            started_at: None,
            finished_at: None,
            processing_time_ms: None,
            attempt: 0,
            history: vec![AgentStatus::Pending],
        }
    }

    /// Prepare a settled record for a new attempt
    ///
    /// Clears the previous outcome and returns the record to `Pending`.
    /// Refuses while an attempt is still in flight.
    pub fn prepare_attempt(&mut self, model_name: impl Into<String>) -> Result<(), DomainError> {
        if self.status == AgentStatus::Extracting {
            return Err(self.transition_error(AgentStatus::Pending));
        }
        self.model_name = model_name.into();
        self.status = AgentStatus::Pending;
        self.extracted_fields.clear();
        self.error_kind = None;
        self.error_message = None;
        self.started_at = None;
        self.finished_at = None;
        self.processing_time_ms = None;
        self.history = vec![AgentStatus::Pending];
        Ok(())
    }

    /// `Pending -> Extracting`
    pub fn start(&mut self) -> Result<(), DomainError> {
        self.advance(AgentStatus::Pending, AgentStatus::Extracting)?;
        self.attempt += 1;
        self.started_at = Some(current_timestamp());
        Ok(())
    }

    /// `Extracting -> Completed`, storing the records verbatim
    pub fn complete(&mut self, fields: FieldRecords) -> Result<(), DomainError> {
        self.advance(AgentStatus::Extracting, AgentStatus::Completed)?;
        self.extracted_fields = fields;
        self.finish_timing();
        Ok(())
    }

    /// `Extracting -> Failed`, storing only the error
    pub fn fail(
        &mut self,
        kind: AdapterErrorKind,
        message: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.advance(AgentStatus::Extracting, AgentStatus::Failed)?;
        self.error_kind = Some(kind);
        self.error_message = Some(message.into());
        self.finish_timing();
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == AgentStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == AgentStatus::Failed
    }

    /// Verify a completed record honors the output contract
    ///
    /// The key set must equal the schema's field names and every non-empty
    /// value must carry an exact text reference.
    pub fn validate_against(&self, schema: &SchemaContract) -> Result<(), DomainError> {
        if !self.is_completed() {
            return Ok(());
        }

        let malformed = |reason: String| DomainError::MalformedExtraction {
            provider: self.provider.to_string(),
            reason,
        };

        if self.extracted_fields.len() != schema.len() {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                schema.len(),
                self.extracted_fields.len()
            )));
        }

        for name in schema.field_names() {
            let record = self
                .extracted_fields
                .get(name)
                .ok_or_else(|| malformed(format!("missing field {}", name)))?;
            if !record.has_provenance() {
                return Err(malformed(format!(
                    "field {} has a value without exact_text_reference",
                    name
                )));
            }
        }

        Ok(())
    }

    fn advance(&mut self, from: AgentStatus, to: AgentStatus) -> Result<(), DomainError> {
        if self.status != from {
            return Err(self.transition_error(to));
        }
        self.status = to;
        self.history.push(to);
        Ok(())
    }

    fn transition_error(&self, to: AgentStatus) -> DomainError {
        DomainError::InvalidTransition {
            provider: self.provider.to_string(),
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }

    fn finish_timing(&mut self) {
        let now = current_timestamp();
        self.finished_at = Some(now);
        self.processing_time_ms = self.started_at.map(|start| now.saturating_sub(start));
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::record::{Confidence, FieldRecord, FieldValue, SourceLocation};
    use crate::schema::{Field, ValueKind};

    fn schema() -> SchemaContract {
        SchemaContract::new(vec![Field::new("sample_size", ValueKind::Integer)]).unwrap()
    }

    fn records(value: FieldValue, quote: &str) -> FieldRecords {
        let mut fields = FieldRecords::new();
        fields.insert(
            "sample_size".to_string(),
            FieldRecord::found(value, Confidence::High, SourceLocation::new(4, quote)),
        );
        fields
    }

    #[test]
    fn test_successful_lifecycle() {
        let mut agent = AgentExtraction::new(ProviderId::Gemini, "gemini-2.5-flash");
        agent.start().unwrap();
        agent
            .complete(records(FieldValue::Integer(531), "531 patients"))
            .unwrap();

        assert!(agent.is_completed());
        assert_eq!(agent.attempt, 1);
        assert!(agent.processing_time_ms.is_some());
        assert_eq!(
            agent.history,
            vec![
                AgentStatus::Pending,
                AgentStatus::Extracting,
                AgentStatus::Completed
            ]
        );
    }

    #[test]
    fn test_failed_lifecycle_keeps_only_error() {
        let mut agent = AgentExtraction::new(ProviderId::Claude, "claude-sonnet-4-5");
        agent.start().unwrap();
        agent.fail(AdapterErrorKind::Timeout, "timed out").unwrap();

        assert!(agent.is_failed());
        assert!(agent.extracted_fields.is_empty());
        assert_eq!(agent.error_kind, Some(AdapterErrorKind::Timeout));
        assert_eq!(agent.error_message.as_deref(), Some("timed out"));
    }

    #[test]
    fn test_cannot_skip_extracting() {
        let mut agent = AgentExtraction::new(ProviderId::Gemini, "m");
        assert!(agent.complete(FieldRecords::new()).is_err());
        assert!(agent.fail(AdapterErrorKind::Unknown, "x").is_err());
        assert_eq!(agent.status, AgentStatus::Pending);
    }

    #[test]
    fn test_cannot_move_backward() {
        let mut agent = AgentExtraction::new(ProviderId::Gemini, "m");
        agent.start().unwrap();
        agent.fail(AdapterErrorKind::Unknown, "x").unwrap();
        assert!(agent.start().is_err());
        assert!(agent.complete(FieldRecords::new()).is_err());
        assert_eq!(agent.status, AgentStatus::Failed);
    }

    #[test]
    fn test_prepare_attempt_resets_settled_record() {
        let mut agent = AgentExtraction::new(ProviderId::Gemini, "m");
        agent.start().unwrap();
        agent.fail(AdapterErrorKind::RateLimited, "429").unwrap();

        agent.prepare_attempt("m2").unwrap();
        assert_eq!(agent.status, AgentStatus::Pending);
        assert!(agent.error_message.is_none());
        assert_eq!(agent.model_name, "m2");

        agent.start().unwrap();
        assert_eq!(agent.attempt, 2);
    }

    #[test]
    fn test_prepare_attempt_refused_while_in_flight() {
        let mut agent = AgentExtraction::new(ProviderId::Gemini, "m");
        agent.start().unwrap();
        assert!(agent.prepare_attempt("m").is_err());
    }

    #[test]
    fn test_validate_against_schema() {
        let mut agent = AgentExtraction::new(ProviderId::Gemini, "m");
        agent.start().unwrap();
        agent.complete(records(FieldValue::Integer(531), "")).unwrap();

        let err = agent.validate_against(&schema()).unwrap_err();
        assert!(err.is_contract_violation());

        let mut agent = AgentExtraction::new(ProviderId::Gemini, "m");
        agent.start().unwrap();
        agent.complete(FieldRecords::new()).unwrap();
        assert!(agent.validate_against(&schema()).is_err());
    }
}
