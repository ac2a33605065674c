//! Compare use case
//!
//! Recomputes the per-field comparison of a session's completed extractions.
//! Nothing is persisted: the report is derived on demand, so it always
//! reflects the records currently in the store.

use crate::ports::extraction_store::{ExtractionStore, StoreError};
use extract_domain::{
    AgentStatus, Agreement, ConsensusEngine, DomainError, FieldComparison, ProviderId, SessionId,
    SessionStatus,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while building a comparison
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Status of one provider in the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStatusEntry {
    pub provider: ProviderId,
    pub model_name: String,
    pub status: AgentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Comparison of a session as shown to reviewers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub session_id: SessionId,
    pub overall_status: SessionStatus,
    pub field_comparisons: Vec<FieldComparison>,
    pub agreement_rate: f64,
    /// Every provider in canonical order, completed or not
    pub per_agent_status: Vec<AgentStatusEntry>,
}

impl ComparisonReport {
    pub fn field(&self, name: &str) -> Option<&FieldComparison> {
        self.field_comparisons.iter().find(|c| c.field_name == name)
    }

    /// Fields without full agreement, left for manual adjudication
    pub fn needs_review(&self) -> impl Iterator<Item = &FieldComparison> {
        self.field_comparisons
            .iter()
            .filter(|c| c.agreement != Agreement::Full)
    }
}

/// Use case for comparing completed extractions
pub struct CompareUseCase<S: ExtractionStore> {
    store: Arc<S>,
}

impl<S: ExtractionStore> CompareUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn get_comparison(&self, session_id: &SessionId) -> Result<ComparisonReport, CompareError> {
        let session = self.store.get_session(session_id)?;
        let report =
            ConsensusEngine::compare(&session.schema, session.agent_extractions.values())?;

        debug!(
            session = %session_id,
            fields = report.field_comparisons.len(),
            agreement_rate = report.agreement_rate,
            "Comparison computed"
        );

        let per_agent_status = session
            .agent_extractions
            .values()
            .map(|agent| AgentStatusEntry {
                provider: agent.provider.clone(),
                model_name: agent.model_name.clone(),
                status: agent.status,
                error: agent.error_kind.map(|kind| match &agent.error_message {
                    Some(message) => format!("{}: {}", kind, message),
                    None => kind.to_string(),
                }),
            })
            .collect();

        Ok(ComparisonReport {
            session_id: session.id,
            overall_status: session.overall_status,
            field_comparisons: report.field_comparisons,
            agreement_rate: report.agreement_rate,
            per_agent_status,
        })
    }
}
