//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Schema must contain at least one field")]
    EmptySchema,

    #[error("Field name cannot be empty")]
    EmptyFieldName,

    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("Malformed agent extraction for {provider}: {reason}")]
    MalformedExtraction { provider: String, reason: String },

    #[error("Invalid status transition for {provider}: {from} -> {to}")]
    InvalidTransition {
        provider: String,
        from: String,
        to: String,
    },

    #[error("No consensus value for field: {0}")]
    NoConsensus(String),

    #[error("Provider {provider} has no completed value for field {field}")]
    NoProviderValue { provider: String, field: String },
}

impl DomainError {
    /// Check if this error signals an upstream adapter contract violation
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            DomainError::MalformedOutput(_) | DomainError::MalformedExtraction { .. }
        )
    }
}
