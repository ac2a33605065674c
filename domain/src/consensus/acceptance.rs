//! Reviewer acceptance of a field value

use super::engine::ConsensusEngine;
use crate::core::error::DomainError;
use crate::core::provider::ProviderId;
use crate::extraction::session::{AcceptedValue, ExtractionSession};
use serde::{Deserialize, Serialize};

/// Which value a reviewer accepts for a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acceptance {
    /// The computed consensus value
    Consensus,
    /// One provider's value, even if it lost the consensus
    Provider(ProviderId),
}

impl std::str::FromStr for Acceptance {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "consensus" => Acceptance::Consensus,
            other => Acceptance::Provider(ProviderId::from(other)),
        })
    }
}

impl Acceptance {
    /// Resolve the accepted value from the session's completed extractions
    ///
    /// The chosen provider's record is copied unchanged, so its confidence,
    /// source location and notes are kept.
    pub fn resolve(
        &self,
        session: &ExtractionSession,
        field_name: &str,
    ) -> Result<AcceptedValue, DomainError> {
        if !session.schema.contains(field_name) {
            return Err(DomainError::UnknownField(field_name.to_string()));
        }

        match self {
            Acceptance::Consensus => {
                let report =
                    ConsensusEngine::compare(&session.schema, session.agent_extractions.values())?;
                let comparison = report
                    .field(field_name)
                    .ok_or_else(|| DomainError::UnknownField(field_name.to_string()))?;
                let (provider, record) = ConsensusEngine::consensus_record(
                    comparison,
                    session.agent_extractions.values(),
                )
                .ok_or_else(|| DomainError::NoConsensus(field_name.to_string()))?;

                Ok(AcceptedValue {
                    source_provider: provider,
                    record: record.clone(),
                })
            }
            Acceptance::Provider(provider) => {
                let record = session
                    .agent(provider)
                    .filter(|a| a.is_completed())
                    .and_then(|a| a.extracted_fields.get(field_name))
                    .ok_or_else(|| DomainError::NoProviderValue {
                        provider: provider.to_string(),
                        field: field_name.to_string(),
                    })?;

                Ok(AcceptedValue {
                    source_provider: provider.clone(),
                    record: record.clone(),
                })
            }
        }
    }
}
