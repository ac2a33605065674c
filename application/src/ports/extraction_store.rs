//! Extraction store port
//!
//! Persistence collaborator for Extraction Sessions and their Agent
//! Extractions. Calls are plain request/response; each write is individually
//! consistent and no cross-call transaction is assumed.

use extract_domain::{
    AcceptedValue, AgentExtraction, ExtractionSession, ProviderId, SessionId, SessionStatus,
};
use thiserror::Error;

/// Errors raised by a store implementation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Session already exists: {0}")]
    SessionExists(SessionId),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Durable storage of sessions, agent records and accepted values
///
/// Agent records are partitioned by `(session, provider)`: concurrent tasks
/// only ever write their own record.
pub trait ExtractionStore: Send + Sync {
    /// Create a new session
    fn create_session(&self, session: ExtractionSession) -> Result<(), StoreError>;

    /// Load a session with all of its agent records and accepted values
    fn get_session(&self, id: &SessionId) -> Result<ExtractionSession, StoreError>;

    /// Write the session's overall status
    fn update_session_status(&self, id: &SessionId, status: SessionStatus)
    -> Result<(), StoreError>;

    /// Load the agent record of one provider, if any
    fn get_agent(
        &self,
        id: &SessionId,
        provider: &ProviderId,
    ) -> Result<Option<AgentExtraction>, StoreError>;

    /// Create or replace the agent record of `agent.provider`
    fn save_agent(&self, id: &SessionId, agent: &AgentExtraction) -> Result<(), StoreError>;

    /// Write the canonical result of one field
    fn update_consensus(
        &self,
        id: &SessionId,
        field_name: &str,
        accepted: &AcceptedValue,
    ) -> Result<(), StoreError>;
}
