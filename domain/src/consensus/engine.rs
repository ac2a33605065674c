//! Consensus Engine
//!
//! Pure function over completed Agent Extractions. For every schema field:
//!
//! 1. Collect `{provider, value, confidence}` from completed providers,
//!    skipping empty values (no answer is not a vote).
//! 2. Classify agreement (see [`Agreement::classify`]).
//! 3. Group equal values and rank groups by
//!    `(high-confidence count, total count)` descending. The top group's
//!    first member becomes the consensus. Ties go to the group encountered
//!    first in canonical provider order ([`ProviderId`]'s `Ord`).
//!
//! Low-confidence values vote in agreement classification like any other
//! value; confidence only matters when picking the consensus.

use super::comparison::{Agreement, ConsensusReport, FieldComparison, ProviderValue};
use crate::core::error::DomainError;
use crate::core::provider::ProviderId;
use crate::extraction::agent::AgentExtraction;
use crate::extraction::record::{Confidence, FieldRecord, FieldValue};
use crate::schema::SchemaContract;

/// Consensus computation over completed agent extractions
pub struct ConsensusEngine;

impl ConsensusEngine {
    /// Compare every schema field across the completed extractions
    ///
    /// Pending and failed extractions are ignored. Errors only when a
    /// completed extraction violates the output contract.
    pub fn compare<'a>(
        schema: &SchemaContract,
        agents: impl IntoIterator<Item = &'a AgentExtraction>,
    ) -> Result<ConsensusReport, DomainError> {
        let mut completed: Vec<&AgentExtraction> =
            agents.into_iter().filter(|a| a.is_completed()).collect();
        completed.sort_by(|a, b| a.provider.cmp(&b.provider));

        for agent in &completed {
            agent.validate_against(schema)?;
        }

        let comparisons = schema
            .field_names()
            .map(|name| Self::compare_field(name, &completed))
            .collect();

        Ok(ConsensusReport::new(comparisons))
    }

    /// Record backing the consensus of one field, with its provider
    pub fn consensus_record<'a>(
        comparison: &FieldComparison,
        agents: impl IntoIterator<Item = &'a AgentExtraction>,
    ) -> Option<(ProviderId, &'a FieldRecord)> {
        let provider = comparison.consensus_provider.as_ref()?;
        agents
            .into_iter()
            .find(|a| a.is_completed() && &a.provider == provider)
            .and_then(|a| a.extracted_fields.get(&comparison.field_name))
            .map(|record| (provider.clone(), record))
    }

    fn compare_field(field_name: &str, completed: &[&AgentExtraction]) -> FieldComparison {
        let per_provider_values: Vec<ProviderValue> = completed
            .iter()
            .filter_map(|agent| {
                let record = agent.extracted_fields.get(field_name)?;
                (!record.is_empty()).then(|| ProviderValue {
                    provider: agent.provider.clone(),
                    value: record.value.clone(),
                    confidence: record.confidence,
                })
            })
            .collect();

        let values: Vec<&FieldValue> = per_provider_values.iter().map(|v| &v.value).collect();
        let agreement = Agreement::classify(&values);
        let winner = select_consensus(&per_provider_values);

        FieldComparison {
            field_name: field_name.to_string(),
            agreement,
            consensus_value: winner.map(|w| w.value.clone()),
            consensus_provider: winner.map(|w| w.provider.clone()),
            per_provider_values,
        }
    }
}

struct ValueGroup<'a> {
    representative: &'a ProviderValue,
    high_count: usize,
    total: usize,
}

impl ValueGroup<'_> {
    fn rank(&self) -> (usize, usize) {
        (self.high_count, self.total)
    }
}

/// Pick the representative of the best-ranked value group
///
/// `values` must already be in canonical provider order; groups are formed
/// in first-encounter order and only a strictly better rank replaces the
/// current best, so ties resolve to the earliest provider.
fn select_consensus(values: &[ProviderValue]) -> Option<&ProviderValue> {
    let mut groups: Vec<ValueGroup<'_>> = Vec::new();

    for vote in values {
        let is_high = vote.confidence == Confidence::High;
        match groups
            .iter_mut()
            .find(|g| g.representative.value == vote.value)
        {
            Some(group) => {
                group.total += 1;
                group.high_count += usize::from(is_high);
            }
            None => groups.push(ValueGroup {
                representative: vote,
                high_count: usize::from(is_high),
                total: 1,
            }),
        }
    }

    let mut best: Option<&ValueGroup<'_>> = None;
    for group in &groups {
        if best.is_none_or(|b| group.rank() > b.rank()) {
            best = Some(group);
        }
    }
    best.map(|g| g.representative)
}
