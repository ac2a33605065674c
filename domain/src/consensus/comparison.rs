//! Field comparison types
//!
//! Derived views over completed Agent Extractions. They are recomputed on
//! demand and never persisted.

use crate::core::provider::ProviderId;
use crate::extraction::record::{Confidence, FieldValue};
use serde::{Deserialize, Serialize};

/// How much providers' non-empty values for a field concur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agreement {
    /// At least two non-empty values, all equal
    Full,
    /// At least two non-empty values, not all equal
    Partial,
    /// Fewer than two non-empty values
    None,
}

impl Agreement {
    /// Classify a list of non-empty values
    pub fn classify(values: &[&FieldValue]) -> Self {
        match values.split_first() {
            Some((first, rest)) if !rest.is_empty() => {
                if rest.iter().all(|v| v == first) {
                    Agreement::Full
                } else {
                    Agreement::Partial
                }
            }
            _ => Agreement::None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Agreement::Full => "full",
            Agreement::Partial => "partial",
            Agreement::None => "none",
        }
    }
}

impl std::fmt::Display for Agreement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One provider's vote for a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderValue {
    pub provider: ProviderId,
    pub value: FieldValue,
    pub confidence: Confidence,
}

/// Comparison of all completed providers' answers for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldComparison {
    pub field_name: String,
    /// Non-empty values in canonical provider order
    pub per_provider_values: Vec<ProviderValue>,
    pub agreement: Agreement,
    /// Proposed value; `None` when no provider answered
    pub consensus_value: Option<FieldValue>,
    /// Provider whose record represents the consensus value
    pub consensus_provider: Option<ProviderId>,
}

impl FieldComparison {
    pub fn has_consensus(&self) -> bool {
        self.consensus_value.is_some()
    }
}

/// Per-field breakdown plus the session agreement rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusReport {
    pub field_comparisons: Vec<FieldComparison>,
    /// Fraction of fields with full agreement (0.0 to 1.0)
    pub agreement_rate: f64,
}

impl ConsensusReport {
    pub fn new(field_comparisons: Vec<FieldComparison>) -> Self {
        let agreement_rate = agreement_rate(&field_comparisons);
        Self {
            field_comparisons,
            agreement_rate,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldComparison> {
        self.field_comparisons.iter().find(|c| c.field_name == name)
    }
}

/// (#fields with full agreement) / (#fields)
pub fn agreement_rate(comparisons: &[FieldComparison]) -> f64 {
    if comparisons.is_empty() {
        return 0.0;
    }
    let full = comparisons
        .iter()
        .filter(|c| c.agreement == Agreement::Full)
        .count();
    full as f64 / comparisons.len() as f64
}
