//! Accept Value use case
//!
//! Records a reviewer's decision for one field. The latest acceptance for a
//! field replaces any earlier one.

use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::extraction_store::{ExtractionStore, StoreError};
use extract_domain::{AcceptedValue, Acceptance, DomainError, SessionId};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when accepting a value
#[derive(Error, Debug)]
pub enum AcceptValueError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Domain(#[from] DomainError),
}

/// Use case for accepting a field value
pub struct AcceptValueUseCase<S: ExtractionStore> {
    store: Arc<S>,
    audit: Arc<dyn AuditLogger>,
}

impl<S: ExtractionStore> AcceptValueUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            audit: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Accept the consensus value or one provider's value for a field
    ///
    /// Returns the canonical result now stored for the field.
    pub fn accept_value(
        &self,
        session_id: &SessionId,
        field_name: &str,
        acceptance: Acceptance,
    ) -> Result<AcceptedValue, AcceptValueError> {
        let session = self.store.get_session(session_id)?;
        let accepted = acceptance.resolve(&session, field_name)?;

        self.store
            .update_consensus(session_id, field_name, &accepted)?;

        info!(
            session = %session_id,
            field = field_name,
            provider = %accepted.source_provider,
            value = %accepted.record.value,
            "Value accepted"
        );
        self.audit.log(AuditEvent::new(
            "value_accepted",
            json!({
                "session_id": session_id,
                "field": field_name,
                "acceptance": acceptance,
                "source_provider": accepted.source_provider,
                "value": accepted.record.value,
            }),
        ));

        Ok(accepted)
    }
}
