//! In-memory [`ExtractionStore`]
//!
//! Sessions live for the lifetime of the process. Every call takes the lock
//! once, so each write is individually consistent.

use extract_application::ports::extraction_store::{ExtractionStore, StoreError};
use extract_domain::{
    AcceptedValue, AgentExtraction, ExtractionSession, ProviderId, SessionId, SessionStatus,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct InMemoryExtractionStore {
    sessions: Mutex<HashMap<SessionId, ExtractionSession>>,
}

impl InMemoryExtractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, ExtractionSession>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Backend("session store lock poisoned".to_string()))
    }

    fn with_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut ExtractionSession) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))?;
        f(session)
    }
}

impl ExtractionStore for InMemoryExtractionStore {
    fn create_session(&self, session: ExtractionSession) -> Result<(), StoreError> {
        let mut sessions = self.lock()?;
        if sessions.contains_key(&session.id) {
            return Err(StoreError::SessionExists(session.id));
        }
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    fn get_session(&self, id: &SessionId) -> Result<ExtractionSession, StoreError> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))
    }

    fn update_session_status(
        &self,
        id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        self.with_session(id, |session| {
            session.overall_status = status;
            Ok(())
        })
    }

    fn get_agent(
        &self,
        id: &SessionId,
        provider: &ProviderId,
    ) -> Result<Option<AgentExtraction>, StoreError> {
        self.with_session(id, |session| Ok(session.agent(provider).cloned()))
    }

    fn save_agent(&self, id: &SessionId, agent: &AgentExtraction) -> Result<(), StoreError> {
        self.with_session(id, |session| {
            session
                .agent_extractions
                .insert(agent.provider.clone(), agent.clone());
            Ok(())
        })
    }

    fn update_consensus(
        &self,
        id: &SessionId,
        field_name: &str,
        accepted: &AcceptedValue,
    ) -> Result<(), StoreError> {
        self.with_session(id, |session| {
            session
                .accept(field_name, accepted.clone())
                .map(|_| ())
                .map_err(|e| StoreError::Backend(e.to_string()))
        })
    }
}
