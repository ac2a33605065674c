//! Test doubles shared by the use case tests.

use crate::ports::audit_logger::{AuditEvent, AuditLogger};
use crate::ports::extraction_backend::{AdapterError, ExtractionBackend};
use crate::ports::extraction_store::{ExtractionStore, StoreError};
use crate::ports::progress::ProgressNotifier;
use async_trait::async_trait;
use extract_domain::{
    AcceptedValue, AgentExtraction, AgentStatus, Confidence, ExtractionSession, Field,
    FieldRecord, FieldRecords, FieldValue, OutputContract, ProviderId, SchemaContract, SessionId,
    SessionStatus, SourceLocation, ValueKind,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Store that keeps sessions in memory and records every agent write
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<SessionId, ExtractionSession>>,
    agent_writes: Mutex<Vec<(ProviderId, AgentStatus)>>,
    status_writes: Mutex<Vec<SessionStatus>>,
    /// Writes of completed/failed records still to be rejected
    rejected_terminal_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn with_session(session: ExtractionSession) -> Self {
        let store = Self::default();
        store.create_session(session).unwrap();
        store
    }

    /// Statuses written for one provider, in write order
    pub fn agent_history(&self, provider: &ProviderId) -> Vec<AgentStatus> {
        self.agent_writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == provider)
            .map(|(_, s)| *s)
            .collect()
    }

    pub fn status_writes(&self) -> Vec<SessionStatus> {
        self.status_writes.lock().unwrap().clone()
    }

    /// Reject the next `count` writes of completed or failed records
    pub fn reject_terminal_writes(&self, count: usize) {
        self.rejected_terminal_writes.store(count, Ordering::SeqCst);
    }

    /// Put a session into the store exactly as given
    pub fn overwrite(&self, session: ExtractionSession) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
    }
}

impl ExtractionStore for MemoryStore {
    fn create_session(&self, session: ExtractionSession) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&session.id) {
            return Err(StoreError::SessionExists(session.id));
        }
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    fn get_session(&self, id: &SessionId) -> Result<ExtractionSession, StoreError> {
        self.sessions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))
    }

    fn update_session_status(
        &self,
        id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))?;
        session.overall_status = status;
        self.status_writes.lock().unwrap().push(status);
        Ok(())
    }

    fn get_agent(
        &self,
        id: &SessionId,
        provider: &ProviderId,
    ) -> Result<Option<AgentExtraction>, StoreError> {
        Ok(self.get_session(id)?.agent(provider).cloned())
    }

    fn save_agent(&self, id: &SessionId, agent: &AgentExtraction) -> Result<(), StoreError> {
        if agent.status.is_terminal()
            && self
                .rejected_terminal_writes
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(StoreError::Backend("write rejected".to_string()));
        }
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))?;
        session
            .agent_extractions
            .insert(agent.provider.clone(), agent.clone());
        self.agent_writes
            .lock()
            .unwrap()
            .push((agent.provider.clone(), agent.status));
        Ok(())
    }

    fn update_consensus(
        &self,
        id: &SessionId,
        field_name: &str,
        accepted: &AcceptedValue,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))?;
        session
            .accept(field_name, accepted.clone())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

/// What a scripted backend does when called
#[derive(Clone)]
pub enum Script {
    Answer(FieldRecords),
    Fail(AdapterError),
    /// Never answers
    Hang,
    Panic,
}

/// Backend replaying a fixed script, optionally after a delay
pub struct ScriptedBackend {
    provider: ProviderId,
    script: Script,
    delay: Option<Duration>,
    calls: Mutex<usize>,
}

impl ScriptedBackend {
    pub fn new(provider: impl Into<ProviderId>, script: Script) -> Self {
        Self {
            provider: provider.into(),
            script,
            delay: None,
            calls: Mutex::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ExtractionBackend for ScriptedBackend {
    fn provider(&self) -> &ProviderId {
        &self.provider
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }

    async fn extract(
        &self,
        _contract: &OutputContract,
        _document: &str,
    ) -> Result<FieldRecords, AdapterError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Answer(records) => Ok(records.clone()),
            Script::Fail(error) => Err(error.clone()),
            Script::Hang => std::future::pending().await,
            Script::Panic => panic!("scripted backend panic"),
        }
    }
}

/// Progress notifier recording every callback as a string
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
}

impl ProgressNotifier for RecordingProgress {
    fn on_run_start(&self, providers: &[ProviderId]) {
        let names: Vec<&str> = providers.iter().map(|p| p.as_str()).collect();
        self.events
            .lock()
            .unwrap()
            .push(format!("run_start:{}", names.join(",")));
    }

    fn on_agent_start(&self, provider: &ProviderId) {
        self.events
            .lock()
            .unwrap()
            .push(format!("agent_start:{}", provider));
    }

    fn on_agent_complete(&self, provider: &ProviderId, status: AgentStatus) {
        self.events
            .lock()
            .unwrap()
            .push(format!("agent_complete:{}:{}", provider, status));
    }

    fn on_run_complete(&self, status: SessionStatus) {
        self.events
            .lock()
            .unwrap()
            .push(format!("run_complete:{}", status));
    }
}

/// Audit logger keeping the event types it saw
#[derive(Default)]
pub struct RecordingAudit {
    pub events: Mutex<Vec<(&'static str, serde_json::Value)>>,
}

impl RecordingAudit {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

impl AuditLogger for RecordingAudit {
    fn log(&self, event: AuditEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}

/// Two-field trial schema: `sample_size` (integer) and `primary_outcome` (text)
pub fn trial_schema() -> SchemaContract {
    SchemaContract::new(vec![
        Field::new("sample_size", ValueKind::Integer),
        Field::new("primary_outcome", ValueKind::Text),
    ])
    .unwrap()
}

pub fn session(id: &str) -> ExtractionSession {
    ExtractionSession::new(id, trial_schema())
}

pub fn found(value: FieldValue, confidence: Confidence, page: u32, quote: &str) -> FieldRecord {
    FieldRecord::found(value, confidence, SourceLocation::new(page, quote))
}

/// Records for the trial schema with the given sample size
pub fn trial_records(sample_size: i64, confidence: Confidence) -> FieldRecords {
    let mut records = FieldRecords::new();
    records.insert(
        "sample_size".to_string(),
        found(
            FieldValue::Integer(sample_size),
            confidence,
            4,
            &format!("A total of {} patients were randomized", sample_size),
        ),
    );
    records.insert(
        "primary_outcome".to_string(),
        found(
            FieldValue::text("Overall survival"),
            Confidence::High,
            2,
            "The primary outcome was overall survival",
        ),
    );
    records
}
