//! Input/output types for the RunExtraction use case.

use crate::ports::extraction_backend::AdapterError;
use crate::ports::extraction_store::StoreError;
use extract_domain::{
    AgentExtraction, AgentStatus, DomainError, FieldRecords, ProviderId, SessionId, SessionStatus,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that fail a whole extraction call
///
/// Adapter failures never show up here: they are scoped to one agent and
/// reported through [`AgentOutcome`].
#[derive(Error, Debug)]
pub enum RunExtractionError {
    #[error("No providers selected")]
    NoProviders,

    #[error("Unknown provider: {0}")]
    UnknownProvider(ProviderId),

    #[error("Provider {0} is already extracting for this session")]
    AgentInFlight(ProviderId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Which providers to launch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderSelection {
    /// Every configured backend
    #[default]
    AllEnabled,
    /// An explicit list; every id must have a configured backend
    Only(Vec<ProviderId>),
}

impl ProviderSelection {
    /// Explicit list when non-empty, otherwise all enabled providers
    pub fn from_ids(ids: Vec<ProviderId>) -> Self {
        if ids.is_empty() {
            ProviderSelection::AllEnabled
        } else {
            ProviderSelection::Only(ids)
        }
    }
}

/// Outcome of one provider's task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentOutcome {
    pub provider: ProviderId,
    pub model_name: String,
    pub status: AgentStatus,
    /// Field records; empty unless completed
    pub field_records: FieldRecords,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AdapterError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
}

impl AgentOutcome {
    pub fn is_success(&self) -> bool {
        self.status == AgentStatus::Completed
    }
}

impl From<&AgentExtraction> for AgentOutcome {
    fn from(agent: &AgentExtraction) -> Self {
        let error = match (agent.error_kind, &agent.error_message) {
            (Some(kind), message) => Some(AdapterError::new(
                kind,
                message.clone().unwrap_or_default(),
            )),
            _ => None,
        };

        Self {
            provider: agent.provider.clone(),
            model_name: agent.model_name.clone(),
            status: agent.status,
            field_records: agent.extracted_fields.clone(),
            error,
            processing_time_ms: agent.processing_time_ms,
        }
    }
}

/// Result of a multi-provider extraction run
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRunOutput {
    pub session_id: SessionId,
    /// Every launched provider's outcome, in canonical provider order
    pub per_provider: Vec<AgentOutcome>,
    pub overall_status: SessionStatus,
}

impl ExtractionRunOutput {
    pub fn outcome(&self, provider: &ProviderId) -> Option<&AgentOutcome> {
        self.per_provider.iter().find(|o| &o.provider == provider)
    }

    pub fn completed_count(&self) -> usize {
        self.per_provider.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.per_provider.len() - self.completed_count()
    }
}
