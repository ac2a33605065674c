//! Run Extraction use case
//!
//! Orchestrates a multi-provider extraction for one session:
//!
//! 1. Resolve the provider set (explicit list or all enabled backends)
//! 2. Reuse each provider's Agent Extraction record or create a pending one
//! 3. Move the session to `extracting`
//! 4. Launch one [`AgentTask`](task::AgentTask) per provider on a `JoinSet`
//! 5. Each task persists its own terminal state as soon as it settles
//! 6. Wait for every launched task, then write the overall status once
//! 7. Return every provider's outcome
//!
//! Providers never wait on each other; one provider's failure, timeout or
//! malformed answer only affects its own record.

mod task;
pub mod types;

pub use types::{AgentOutcome, ExtractionRunOutput, ProviderSelection, RunExtractionError};

use crate::config::ExtractionParams;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::extraction_backend::{AdapterError, ExtractionBackend};
use crate::ports::extraction_store::ExtractionStore;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use extract_domain::{
    AdapterErrorKind, AgentExtraction, AgentStatus, OutputContract, ProviderId, SessionId,
    SessionStatus,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use task::AgentTask;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Use case for running extractions across providers
pub struct RunExtractionUseCase<S: ExtractionStore + 'static> {
    store: Arc<S>,
    backends: Vec<Arc<dyn ExtractionBackend>>,
    params: ExtractionParams,
    audit: Arc<dyn AuditLogger>,
}

impl<S: ExtractionStore + 'static> RunExtractionUseCase<S> {
    /// Create the use case with the enabled backends
    pub fn new(store: Arc<S>, backends: Vec<Arc<dyn ExtractionBackend>>) -> Self {
        Self {
            store,
            backends,
            params: ExtractionParams::default(),
            audit: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_params(mut self, params: ExtractionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Enabled providers in canonical order
    pub fn enabled_providers(&self) -> Vec<ProviderId> {
        ProviderId::canonical(self.backends.iter().map(|b| b.provider().clone()).collect())
    }

    /// Run every selected provider with default (no-op) progress
    pub async fn run_extraction(
        &self,
        session_id: &SessionId,
        document: &str,
        selection: ProviderSelection,
    ) -> Result<ExtractionRunOutput, RunExtractionError> {
        self.run_extraction_with_progress(session_id, document, selection, &NoProgress)
            .await
    }

    /// Run every selected provider with progress callbacks
    pub async fn run_extraction_with_progress(
        &self,
        session_id: &SessionId,
        document: &str,
        selection: ProviderSelection,
        progress: &dyn ProgressNotifier,
    ) -> Result<ExtractionRunOutput, RunExtractionError> {
        let backends = self.resolve(&selection)?;
        let (outcomes, overall_status) = self.launch(session_id, document, backends, progress).await?;

        Ok(ExtractionRunOutput {
            session_id: session_id.clone(),
            per_provider: outcomes,
            overall_status,
        })
    }

    /// Run one provider for the session
    pub async fn run_single_agent(
        &self,
        session_id: &SessionId,
        document: &str,
        provider: &ProviderId,
    ) -> Result<AgentOutcome, RunExtractionError> {
        let backends = self.resolve(&ProviderSelection::Only(vec![provider.clone()]))?;
        let (outcomes, _) = self
            .launch(session_id, document, backends, &NoProgress)
            .await?;

        outcomes
            .into_iter()
            .next()
            .ok_or_else(|| RunExtractionError::UnknownProvider(provider.clone()))
    }

    /// Map a selection onto configured backends, in canonical order
    fn resolve(
        &self,
        selection: &ProviderSelection,
    ) -> Result<Vec<Arc<dyn ExtractionBackend>>, RunExtractionError> {
        let by_provider: BTreeMap<&ProviderId, &Arc<dyn ExtractionBackend>> = self
            .backends
            .iter()
            .map(|b| (b.provider(), b))
            .collect();

        let selected: Vec<Arc<dyn ExtractionBackend>> = match selection {
            ProviderSelection::AllEnabled => by_provider.values().map(|b| Arc::clone(b)).collect(),
            ProviderSelection::Only(ids) => {
                let mut selected = Vec::new();
                for id in ProviderId::canonical(ids.clone()) {
                    let backend = by_provider
                        .get(&id)
                        .ok_or(RunExtractionError::UnknownProvider(id.clone()))?;
                    selected.push(Arc::clone(backend));
                }
                selected
            }
        };

        if selected.is_empty() {
            return Err(RunExtractionError::NoProviders);
        }
        Ok(selected)
    }

    /// Fan out one task per backend and wait for all of them
    async fn launch(
        &self,
        session_id: &SessionId,
        document: &str,
        backends: Vec<Arc<dyn ExtractionBackend>>,
        progress: &dyn ProgressNotifier,
    ) -> Result<(Vec<AgentOutcome>, SessionStatus), RunExtractionError> {
        let session = self.store.get_session(session_id)?;
        let contract = Arc::new(OutputContract::compile(&session.schema));
        let document: Arc<str> = Arc::from(document);

        // Prepare every record before anything launches so a refusal leaves
        // the session untouched
        let mut agents = Vec::with_capacity(backends.len());
        for backend in &backends {
            let provider = backend.provider();
            let agent = match session.agent(provider) {
                Some(existing) => {
                    let mut agent = existing.clone();
                    agent
                        .prepare_attempt(backend.model_name())
                        .map_err(|_| RunExtractionError::AgentInFlight(provider.clone()))?;
                    agent
                }
                None => AgentExtraction::new(provider.clone(), backend.model_name()),
            };
            agents.push(agent);
        }

        let providers: Vec<ProviderId> = backends.iter().map(|b| b.provider().clone()).collect();
        info!(
            session = %session_id,
            providers = %providers.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(","),
            fields = session.schema.len(),
            "Starting extraction"
        );

        for agent in &agents {
            self.store.save_agent(session_id, agent)?;
        }
        self.store
            .update_session_status(session_id, SessionStatus::Extracting)?;
        progress.on_run_start(&providers);

        let mut join_set = JoinSet::new();
        for (backend, agent) in backends.into_iter().zip(agents) {
            progress.on_agent_start(backend.provider());
            let task = AgentTask {
                store: Arc::clone(&self.store),
                session_id: session_id.clone(),
                backend,
                contract: Arc::clone(&contract),
                document: Arc::clone(&document),
                agent,
                timeout: self.params.agent_timeout,
                audit: Arc::clone(&self.audit),
            };
            join_set.spawn(task.run());
        }

        // Barrier: collect every outcome, never stop at the first one
        let mut outcomes: BTreeMap<ProviderId, AgentOutcome> = BTreeMap::new();
        let mut unsaved = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(report) => {
                    let outcome = report.outcome;
                    progress.on_agent_complete(&outcome.provider, outcome.status);
                    unsaved.extend(report.unsaved);
                    outcomes.insert(outcome.provider.clone(), outcome);
                }
                Err(e) => {
                    warn!("Agent task join error: {}", e);
                }
            }
        }

        for provider in &providers {
            if !outcomes.contains_key(provider) {
                let outcome = self.fail_aborted(session_id, provider)?;
                progress.on_agent_complete(provider, outcome.status);
                outcomes.insert(provider.clone(), outcome);
            }
        }

        // The overall status is derived from the store, so every settled
        // record must be there first
        for agent in &unsaved {
            self.store.save_agent(session_id, agent)?;
        }

        let settled = self.store.get_session(session_id)?;
        let overall_status = settled.derived_status();
        self.store.update_session_status(session_id, overall_status)?;
        progress.on_run_complete(overall_status);

        let completed = outcomes.values().filter(|o| o.is_success()).count();
        info!(
            session = %session_id,
            status = %overall_status,
            completed,
            failed = outcomes.len() - completed,
            "Extraction settled"
        );
        self.audit.log(AuditEvent::new(
            "session_settled",
            json!({
                "session_id": session_id,
                "overall_status": overall_status,
                "completed": completed,
                "failed": outcomes.len() - completed,
            }),
        ));

        Ok((outcomes.into_values().collect(), overall_status))
    }

    /// Settle the record of a task that ended without reporting (panic or abort)
    fn fail_aborted(
        &self,
        session_id: &SessionId,
        provider: &ProviderId,
    ) -> Result<AgentOutcome, RunExtractionError> {
        let mut agent = self
            .store
            .get_agent(session_id, provider)?
            .ok_or_else(|| RunExtractionError::UnknownProvider(provider.clone()))?;

        let error = AdapterError::new(AdapterErrorKind::Unknown, "agent task aborted");
        if agent.status == AgentStatus::Pending {
            agent.start()?;
        }
        if !agent.status.is_terminal() {
            agent.fail(error.kind, error.message)?;
            self.store.save_agent(session_id, &agent)?;
        }
        Ok(AgentOutcome::from(&agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::testing::{
        MemoryStore, RecordingAudit, RecordingProgress, Script, ScriptedBackend, session,
        trial_records,
    };
    use crate::ports::extraction_store::StoreError;
    use extract_domain::{Confidence, ConsensusEngine, FieldRecords, FieldValue};
    use std::time::Duration;

    fn backend(provider: &str, script: Script) -> Arc<dyn ExtractionBackend> {
        Arc::new(ScriptedBackend::new(provider, script))
    }

    fn answer(sample_size: i64) -> Script {
        Script::Answer(trial_records(sample_size, Confidence::High))
    }

    #[tokio::test]
    async fn test_all_providers_complete() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let use_case = RunExtractionUseCase::new(
            store.clone(),
            vec![backend("claude", answer(531)), backend("gemini", answer(531))],
        );

        let output = use_case
            .run_extraction(&"s1".into(), "document", ProviderSelection::AllEnabled)
            .await
            .unwrap();

        assert_eq!(output.overall_status, SessionStatus::Completed);
        assert_eq!(output.completed_count(), 2);
        // canonical order, not configuration order
        assert_eq!(output.per_provider[0].provider, ProviderId::Gemini);
        assert_eq!(output.per_provider[1].provider, ProviderId::Claude);

        let stored = store.get_session(&"s1".into()).unwrap();
        assert_eq!(stored.overall_status, SessionStatus::Completed);
        assert_eq!(stored.agent_extractions.len(), 2);
        assert!(stored.agent_extractions.values().all(|a| a.attempt == 1));
    }

    #[tokio::test]
    async fn test_lost_terminal_write_is_persisted_before_status() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        store.reject_terminal_writes(1);
        let use_case = RunExtractionUseCase::new(store.clone(), vec![backend("gemini", answer(531))]);

        let output = use_case
            .run_extraction(&"s1".into(), "document", ProviderSelection::AllEnabled)
            .await
            .unwrap();

        assert_eq!(output.overall_status, SessionStatus::Completed);
        let stored = store.get_session(&"s1".into()).unwrap();
        assert_eq!(
            stored.agent(&ProviderId::Gemini).unwrap().status,
            AgentStatus::Completed
        );
        assert_eq!(stored.overall_status, SessionStatus::Completed);
        assert_eq!(
            store.status_writes(),
            vec![SessionStatus::Extracting, SessionStatus::Completed]
        );
    }

    #[tokio::test]
    async fn test_unpersistable_record_fails_the_run() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        store.reject_terminal_writes(usize::MAX);
        let use_case = RunExtractionUseCase::new(store.clone(), vec![backend("gemini", answer(531))]);

        let result = use_case
            .run_extraction(&"s1".into(), "document", ProviderSelection::AllEnabled)
            .await;

        assert!(matches!(
            result,
            Err(RunExtractionError::Store(StoreError::Backend(_)))
        ));
        // never reports a settled status the store cannot back
        assert_eq!(store.status_writes(), vec![SessionStatus::Extracting]);
    }

    #[tokio::test]
    async fn test_status_writes_are_monotonic() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let use_case = RunExtractionUseCase::new(
            store.clone(),
            vec![
                backend("gemini", answer(531)),
                backend(
                    "claude",
                    Script::Fail(AdapterError::transport("connection reset")),
                ),
            ],
        );

        use_case
            .run_extraction(&"s1".into(), "document", ProviderSelection::AllEnabled)
            .await
            .unwrap();

        assert_eq!(
            store.agent_history(&ProviderId::Gemini),
            vec![
                AgentStatus::Pending,
                AgentStatus::Extracting,
                AgentStatus::Completed
            ]
        );
        assert_eq!(
            store.agent_history(&ProviderId::Claude),
            vec![
                AgentStatus::Pending,
                AgentStatus::Extracting,
                AgentStatus::Failed
            ]
        );
        // overall status written once when launching and once when settled
        assert_eq!(
            store.status_writes(),
            vec![SessionStatus::Extracting, SessionStatus::Completed]
        );
    }

    #[tokio::test]
    async fn test_one_failing_provider_is_isolated() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let use_case = RunExtractionUseCase::new(
            store.clone(),
            vec![
                backend("gemini", answer(531)),
                backend("claude", Script::Fail(AdapterError::transport("refused"))),
                backend("openai", answer(530)),
            ],
        );

        let output = use_case
            .run_extraction(&"s1".into(), "document", ProviderSelection::AllEnabled)
            .await
            .unwrap();

        assert_eq!(output.overall_status, SessionStatus::Completed);
        let claude = output.outcome(&ProviderId::Claude).unwrap();
        assert_eq!(claude.status, AgentStatus::Failed);
        assert_eq!(
            claude.error.as_ref().map(|e| e.kind),
            Some(AdapterErrorKind::TransportError)
        );
        assert!(claude.field_records.is_empty());

        let gemini = output.outcome(&ProviderId::Gemini).unwrap();
        assert_eq!(
            gemini.field_records["sample_size"].value,
            FieldValue::Integer(531)
        );
        let openai = output.outcome(&ProviderId::OpenAi).unwrap();
        assert_eq!(
            openai.field_records["sample_size"].value,
            FieldValue::Integer(530)
        );
    }

    #[tokio::test]
    async fn test_timeout_only_fails_slow_provider() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let use_case = RunExtractionUseCase::new(
            store.clone(),
            vec![
                backend("gemini", answer(531)),
                backend("claude", answer(531)),
                backend("openai", Script::Hang),
            ],
        )
        .with_params(ExtractionParams::default().with_agent_timeout(Duration::from_millis(50)));

        let output = use_case
            .run_extraction(&"s1".into(), "document", ProviderSelection::AllEnabled)
            .await
            .unwrap();

        assert_eq!(output.overall_status, SessionStatus::Completed);
        assert_eq!(output.completed_count(), 2);
        let openai = output.outcome(&ProviderId::OpenAi).unwrap();
        assert_eq!(openai.status, AgentStatus::Failed);
        assert_eq!(
            openai.error.as_ref().map(|e| e.kind),
            Some(AdapterErrorKind::Timeout)
        );

        let stored = store.get_session(&"s1".into()).unwrap();
        let report =
            ConsensusEngine::compare(&stored.schema, stored.agent_extractions.values()).unwrap();
        let sample_size = report.field("sample_size").unwrap();
        assert_eq!(sample_size.per_provider_values.len(), 2);
        assert_eq!(sample_size.consensus_value, Some(FieldValue::Integer(531)));
    }

    #[tokio::test]
    async fn test_all_providers_fail() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let use_case = RunExtractionUseCase::new(
            store.clone(),
            vec![
                backend("gemini", Script::Fail(AdapterError::auth_failure("HTTP 401"))),
                backend("claude", Script::Fail(AdapterError::rate_limited("HTTP 429"))),
            ],
        );

        let output = use_case
            .run_extraction(&"s1".into(), "document", ProviderSelection::AllEnabled)
            .await
            .unwrap();

        assert_eq!(output.overall_status, SessionStatus::Failed);
        assert_eq!(output.failed_count(), 2);
        assert_eq!(
            store.get_session(&"s1".into()).unwrap().overall_status,
            SessionStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_incomplete_records_are_malformed_output() {
        let mut partial = FieldRecords::new();
        partial.insert(
            "sample_size".to_string(),
            trial_records(531, Confidence::High)["sample_size"].clone(),
        );

        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let use_case = RunExtractionUseCase::new(
            store.clone(),
            vec![
                backend("gemini", Script::Answer(partial)),
                backend("claude", answer(531)),
            ],
        );

        let output = use_case
            .run_extraction(&"s1".into(), "document", ProviderSelection::AllEnabled)
            .await
            .unwrap();

        let gemini = output.outcome(&ProviderId::Gemini).unwrap();
        assert_eq!(gemini.status, AgentStatus::Failed);
        assert_eq!(
            gemini.error.as_ref().map(|e| e.kind),
            Some(AdapterErrorKind::MalformedOutput)
        );
        assert_eq!(output.overall_status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_panicking_task_is_marked_failed() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let use_case = RunExtractionUseCase::new(
            store.clone(),
            vec![backend("gemini", answer(531)), backend("claude", Script::Panic)],
        );

        let output = use_case
            .run_extraction(&"s1".into(), "document", ProviderSelection::AllEnabled)
            .await
            .unwrap();

        assert_eq!(output.per_provider.len(), 2);
        let claude = output.outcome(&ProviderId::Claude).unwrap();
        assert_eq!(claude.status, AgentStatus::Failed);
        assert_eq!(
            claude.error.as_ref().map(|e| e.kind),
            Some(AdapterErrorKind::Unknown)
        );
        assert_eq!(output.overall_status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_no_providers_is_rejected_before_writes() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let use_case = RunExtractionUseCase::new(store.clone(), vec![]);

        let result = use_case
            .run_extraction(&"s1".into(), "document", ProviderSelection::AllEnabled)
            .await;

        assert!(matches!(result, Err(RunExtractionError::NoProviders)));
        assert!(store.status_writes().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let use_case =
            RunExtractionUseCase::new(store.clone(), vec![backend("gemini", answer(531))]);

        let result = use_case
            .run_extraction(
                &"s1".into(),
                "document",
                ProviderSelection::Only(vec![ProviderId::Gemini, ProviderId::OpenAi]),
            )
            .await;

        match result {
            Err(RunExtractionError::UnknownProvider(id)) => assert_eq!(id, ProviderId::OpenAi),
            other => panic!("expected UnknownProvider, got {:?}", other.map(|o| o.overall_status)),
        }
        assert!(store.get_session(&"s1".into()).unwrap().agent_extractions.is_empty());
    }

    #[tokio::test]
    async fn test_missing_session() {
        let store = Arc::new(MemoryStore::default());
        let use_case =
            RunExtractionUseCase::new(store.clone(), vec![backend("gemini", answer(531))]);

        let result = use_case
            .run_extraction(&"nope".into(), "document", ProviderSelection::AllEnabled)
            .await;

        assert!(matches!(
            result,
            Err(RunExtractionError::Store(StoreError::SessionNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_selected_subset_only_runs_those() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let gemini = Arc::new(ScriptedBackend::new("gemini", answer(531)));
        let claude = Arc::new(ScriptedBackend::new("claude", answer(531)));
        let use_case = RunExtractionUseCase::new(
            store.clone(),
            vec![gemini.clone() as Arc<dyn ExtractionBackend>, claude.clone()],
        );

        let output = use_case
            .run_extraction(
                &"s1".into(),
                "document",
                ProviderSelection::Only(vec![ProviderId::Claude]),
            )
            .await
            .unwrap();

        assert_eq!(output.per_provider.len(), 1);
        assert_eq!(gemini.calls(), 0);
        assert_eq!(claude.calls(), 1);
    }

    #[tokio::test]
    async fn test_rerun_reuses_record() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let use_case =
            RunExtractionUseCase::new(store.clone(), vec![backend("gemini", answer(531))]);

        use_case
            .run_single_agent(&"s1".into(), "document", &ProviderId::Gemini)
            .await
            .unwrap();
        let outcome = use_case
            .run_single_agent(&"s1".into(), "document", &ProviderId::Gemini)
            .await
            .unwrap();

        assert!(outcome.is_success());
        let stored = store.get_session(&"s1".into()).unwrap();
        assert_eq!(stored.agent_extractions.len(), 1);
        assert_eq!(stored.agent(&ProviderId::Gemini).unwrap().attempt, 2);
    }

    #[tokio::test]
    async fn test_in_flight_record_is_refused() {
        let mut in_flight = session("s1");
        let mut agent = AgentExtraction::new(ProviderId::Gemini, "scripted-model");
        agent.start().unwrap();
        in_flight
            .agent_extractions
            .insert(ProviderId::Gemini, agent);
        let store = Arc::new(MemoryStore::default());
        store.overwrite(in_flight);

        let use_case =
            RunExtractionUseCase::new(store.clone(), vec![backend("gemini", answer(531))]);
        let result = use_case
            .run_single_agent(&"s1".into(), "document", &ProviderId::Gemini)
            .await;

        assert!(matches!(result, Err(RunExtractionError::AgentInFlight(_))));
        assert!(store.status_writes().is_empty());
    }

    #[tokio::test]
    async fn test_progress_and_audit_events() {
        let store = Arc::new(MemoryStore::with_session(session("s1")));
        let audit = Arc::new(RecordingAudit::default());
        let use_case = RunExtractionUseCase::new(
            store.clone(),
            vec![
                backend("gemini", answer(531)),
                backend("claude", Script::Fail(AdapterError::unknown("boom"))),
            ],
        )
        .with_audit_logger(audit.clone());
        let progress = RecordingProgress::default();

        use_case
            .run_extraction_with_progress(
                &"s1".into(),
                "document",
                ProviderSelection::AllEnabled,
                &progress,
            )
            .await
            .unwrap();

        let events = progress.events.lock().unwrap().clone();
        assert_eq!(events.first().map(String::as_str), Some("run_start:gemini,claude"));
        assert_eq!(events.last().map(String::as_str), Some("run_complete:completed"));
        assert!(events.contains(&"agent_complete:claude:failed".to_string()));

        let types = audit.event_types();
        assert_eq!(types.iter().filter(|t| **t == "agent_started").count(), 2);
        assert!(types.contains(&"agent_completed"));
        assert!(types.contains(&"agent_failed"));
        assert_eq!(types.last(), Some(&"session_settled"));
    }
}
