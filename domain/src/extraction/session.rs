//! Extraction Session entity

use super::agent::{AgentExtraction, AgentStatus};
use super::record::FieldRecord;
use crate::core::error::DomainError;
use crate::core::provider::ProviderId;
use crate::schema::SchemaContract;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Overall status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Pending,
    Extracting,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Extracting => "extracting",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    /// Derive the overall status from agent statuses
    ///
    /// `Extracting` while any agent is not terminal, `Completed` once every
    /// agent settled and at least one completed, `Failed` when every agent
    /// failed. No agents at all leaves the session `Pending`.
    pub fn derive<'a>(statuses: impl IntoIterator<Item = &'a AgentStatus>) -> Self {
        let mut any = false;
        let mut any_completed = false;
        for status in statuses {
            any = true;
            if !status.is_terminal() {
                return SessionStatus::Extracting;
            }
            any_completed |= *status == AgentStatus::Completed;
        }

        match (any, any_completed) {
            (false, _) => SessionStatus::Pending,
            (true, true) => SessionStatus::Completed,
            (true, false) => SessionStatus::Failed,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical, reviewer-accepted result for one field
///
/// Carries the source provider's record unchanged, so the original
/// confidence, source location and notes travel with the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedValue {
    pub source_provider: ProviderId,
    #[serde(flatten)]
    pub record: FieldRecord,
}

/// Durable record of one extraction request (Entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSession {
    pub id: SessionId,
    pub schema: SchemaContract,
    /// Agent records keyed (and therefore ordered) by provider
    #[serde(default)]
    pub agent_extractions: BTreeMap<ProviderId, AgentExtraction>,
    #[serde(default)]
    pub overall_status: SessionStatus,
    /// Canonical per-field results
    #[serde(default)]
    pub consensus: BTreeMap<String, AcceptedValue>,
}

impl ExtractionSession {
    pub fn new(id: impl Into<SessionId>, schema: SchemaContract) -> Self {
        Self {
            id: id.into(),
            schema,
            agent_extractions: BTreeMap::new(),
            overall_status: SessionStatus::Pending,
            consensus: BTreeMap::new(),
        }
    }

    pub fn agent(&self, provider: &ProviderId) -> Option<&AgentExtraction> {
        self.agent_extractions.get(provider)
    }

    /// Completed agent records in canonical provider order
    pub fn completed_agents(&self) -> impl Iterator<Item = &AgentExtraction> {
        self.agent_extractions.values().filter(|a| a.is_completed())
    }

    /// Status derived from the current agent records
    pub fn derived_status(&self) -> SessionStatus {
        SessionStatus::derive(self.agent_extractions.values().map(|a| &a.status))
    }

    /// Overwrite the canonical result for a field (last accepted wins)
    pub fn accept(
        &mut self,
        field_name: &str,
        accepted: AcceptedValue,
    ) -> Result<&AcceptedValue, DomainError> {
        if !self.schema.contains(field_name) {
            return Err(DomainError::UnknownField(field_name.to_string()));
        }
        self.consensus.insert(field_name.to_string(), accepted);
        self.consensus
            .get(field_name)
            .ok_or_else(|| DomainError::UnknownField(field_name.to_string()))
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
