//! Agent Task: one attempt of one backend for one session.
//!
//! The task owns its provider's record for the whole attempt, persists each
//! status change as it happens and never retries.

use super::types::AgentOutcome;
use crate::ports::audit_logger::{AuditEvent, AuditLogger};
use crate::ports::extraction_backend::{AdapterError, ExtractionBackend};
use crate::ports::extraction_store::{ExtractionStore, StoreError};
use extract_domain::{AgentExtraction, FieldRecords, OutputContract, SessionId};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What a settled task hands back to the orchestrator
pub(crate) struct TaskReport {
    pub outcome: AgentOutcome,
    /// Settled record the task could not write; the orchestrator must
    /// persist it before deriving the session status
    pub unsaved: Option<AgentExtraction>,
}

/// Everything a spawned task needs, owned so it can run on any worker
pub(crate) struct AgentTask<S: ExtractionStore + ?Sized> {
    pub store: Arc<S>,
    pub session_id: SessionId,
    pub backend: Arc<dyn ExtractionBackend>,
    pub contract: Arc<OutputContract>,
    pub document: Arc<str>,
    pub agent: AgentExtraction,
    pub timeout: Duration,
    pub audit: Arc<dyn AuditLogger>,
}

impl<S: ExtractionStore + ?Sized> AgentTask<S> {
    /// Run the attempt to a terminal state and return its outcome
    pub async fn run(mut self) -> TaskReport {
        let provider = self.agent.provider.clone();

        if let Err(e) = self.agent.start() {
            warn!(provider = %provider, "Cannot start agent task: {}", e);
            return TaskReport {
                outcome: AgentOutcome::from(&self.agent),
                unsaved: None,
            };
        }
        // A lost `extracting` write is superseded by the terminal write below
        if let Err(e) = self.persist() {
            warn!(provider = %provider, "Failed to persist extracting state: {}", e);
        }
        self.audit.log(AuditEvent::new(
            "agent_started",
            json!({
                "session_id": self.session_id,
                "provider": provider,
                "model": self.agent.model_name,
                "attempt": self.agent.attempt,
            }),
        ));
        debug!(provider = %provider, model = %self.agent.model_name, "Agent extracting");

        let result = self.call_backend().await;

        let settled = match result {
            Ok(fields) => self.agent.complete(fields),
            Err(e) => self.agent.fail(e.kind, e.message),
        };
        if let Err(e) = settled {
            warn!(provider = %provider, "Agent task could not settle: {}", e);
        }
        let unsaved = match self.persist() {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    provider = %provider,
                    status = %self.agent.status,
                    "Failed to persist settled agent record: {}",
                    e
                );
                Some(self.agent.clone())
            }
        };

        let outcome = AgentOutcome::from(&self.agent);
        match &outcome.error {
            None => {
                info!(
                    provider = %provider,
                    elapsed_ms = outcome.processing_time_ms.unwrap_or_default(),
                    "Agent completed"
                );
                self.audit.log(AuditEvent::new(
                    "agent_completed",
                    json!({
                        "session_id": self.session_id,
                        "provider": provider,
                        "fields": outcome.field_records.len(),
                        "elapsed_ms": outcome.processing_time_ms,
                    }),
                ));
            }
            Some(error) => {
                warn!(provider = %provider, kind = %error.kind, "Agent failed: {}", error.message);
                self.audit.log(AuditEvent::new(
                    "agent_failed",
                    json!({
                        "session_id": self.session_id,
                        "provider": provider,
                        "kind": error.kind,
                        "message": error.message,
                        "elapsed_ms": outcome.processing_time_ms,
                    }),
                ));
            }
        }

        TaskReport { outcome, unsaved }
    }

    /// Call the backend under this task's own bounded wait and re-check
    /// the records against the output contract
    async fn call_backend(&self) -> Result<FieldRecords, AdapterError> {
        let call = self.backend.extract(&self.contract, &self.document);
        let fields = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                AdapterError::timeout(format!(
                    "no response within {}s",
                    self.timeout.as_secs_f64()
                ))
            })??;

        self.contract
            .check_records(&fields)
            .map_err(|e| AdapterError::malformed_output(e.to_string()))?;
        Ok(fields)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save_agent(&self.session_id, &self.agent)
    }
}
