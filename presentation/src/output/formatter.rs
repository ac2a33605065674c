//! Output formatter trait

use extract_application::{ComparisonReport, ExtractionRunOutput};
use extract_domain::{AcceptedValue, OutputFormat};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything shown to the reviewer after a run
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionView<'a> {
    pub run: &'a ExtractionRunOutput,
    pub comparison: &'a ComparisonReport,
    /// Values accepted on the command line, by field name
    pub accepted: &'a BTreeMap<String, AcceptedValue>,
}

/// Trait for formatting extraction results
pub trait OutputFormatter {
    /// Provider outcomes plus the field-by-field comparison
    fn format_full(&self, view: &ExtractionView<'_>) -> String;

    /// Only the consensus (or accepted) value per field
    fn format_consensus(&self, view: &ExtractionView<'_>) -> String;

    /// Format as JSON
    fn format_json(&self, view: &ExtractionView<'_>) -> String;

    fn render(&self, format: OutputFormat, view: &ExtractionView<'_>) -> String {
        match format {
            OutputFormat::Full => self.format_full(view),
            OutputFormat::Consensus => self.format_consensus(view),
            OutputFormat::Json => self.format_json(view),
        }
    }
}
