//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for extraction results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Per-provider outcomes plus the field-by-field comparison
    #[default]
    Full,
    /// Only the consensus value per field
    Consensus,
    /// JSON output
    Json,
}
