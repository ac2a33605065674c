//! Console output formatter for extraction results

use crate::output::formatter::{ExtractionView, OutputFormatter};
use colored::{ColoredString, Colorize};
use extract_application::{AgentOutcome, ComparisonReport};
use extract_domain::{AcceptedValue, Agreement, FieldComparison, SessionStatus, util::excerpt};

/// Longest quote shown inline
const QUOTE_PREVIEW: usize = 80;

/// Formats extraction results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete run: provider outcomes, comparisons, accepted values
    pub fn format_full(view: &ExtractionView<'_>) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Extraction Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n{} {}\n",
            "Session:".cyan().bold(),
            view.run.session_id,
            "Status:".cyan().bold(),
            Self::session_status(view.run.overall_status)
        ));

        output.push_str(&Self::section_header("Providers"));
        for outcome in &view.run.per_provider {
            output.push_str(&Self::format_outcome(outcome));
        }

        output.push_str(&Self::section_header("Fields"));
        if view.comparison.field_comparisons.is_empty() {
            output.push_str("\n(no fields)\n");
        }
        for comparison in &view.comparison.field_comparisons {
            output.push_str(&Self::format_comparison(comparison));
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Agreement rate:".cyan().bold(),
            Self::percent(view.comparison.agreement_rate)
        ));

        let review: Vec<&str> = view
            .comparison
            .needs_review()
            .map(|c| c.field_name.as_str())
            .filter(|name| !view.accepted.contains_key(*name))
            .collect();
        if !review.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Needs review:".yellow().bold(),
                review.join(", ")
            ));
        }

        if !view.accepted.is_empty() {
            output.push_str(&Self::section_header("Accepted Values"));
            for (field, accepted) in view.accepted {
                output.push_str(&format!("  {}\n", Self::format_accepted(field, accepted)));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// One line per field: the accepted value if any, else the consensus
    pub fn format_consensus(view: &ExtractionView<'_>) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Extraction Consensus ===".cyan().bold()
        ));

        for comparison in &view.comparison.field_comparisons {
            let name = &comparison.field_name;
            let line = match (view.accepted.get(name), &comparison.consensus_value) {
                (Some(accepted), _) => format!(
                    "{} ({}, {})",
                    accepted.record.value,
                    accepted.source_provider,
                    "accepted".green()
                ),
                (None, Some(value)) => format!(
                    "{} ({}, {})",
                    value,
                    comparison
                        .consensus_provider
                        .as_ref()
                        .map(|p| p.as_str())
                        .unwrap_or("-"),
                    Self::agreement(comparison.agreement)
                ),
                (None, None) => "not found".dimmed().to_string(),
            };
            output.push_str(&format!("{}: {}\n", name.bold(), line));
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Agreement rate:".dimmed(),
            Self::percent(view.comparison.agreement_rate)
        ));

        output
    }

    /// Format as JSON
    pub fn format_json(view: &ExtractionView<'_>) -> String {
        serde_json::to_string_pretty(view).unwrap_or_else(|_| "{}".to_string())
    }

    /// Comparison report alone, as written by `--export`
    pub fn format_report_json(report: &ComparisonReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Confirmation line for an accepted value
    pub fn format_accepted(field: &str, accepted: &AcceptedValue) -> String {
        let source = &accepted.record.source_location;
        format!(
            "{} {} = {} (from {}, {} confidence, page {}) {}",
            "v".green(),
            field.bold(),
            accepted.record.value,
            accepted.source_provider,
            accepted.record.confidence,
            source.page,
            Self::quote(&source.exact_text_reference).dimmed()
        )
    }

    fn format_outcome(outcome: &AgentOutcome) -> String {
        let title = format!("── {} ({}) ──", outcome.provider, outcome.model_name);
        let elapsed = outcome
            .processing_time_ms
            .map(|ms| format!(" in {}ms", ms))
            .unwrap_or_default();

        match &outcome.error {
            None if outcome.is_success() => format!(
                "\n{}\n{}{}, {} fields\n",
                title.green().bold(),
                outcome.status,
                elapsed,
                outcome.field_records.len()
            ),
            None => format!("\n{}\n{}\n", title.yellow().bold(), outcome.status),
            Some(error) => format!(
                "\n{}\nError{}: {}\n",
                title.red().bold(),
                elapsed,
                error
            ),
        }
    }

    fn format_comparison(comparison: &FieldComparison) -> String {
        let mut output = format!(
            "\n{} [{}]\n",
            comparison.field_name.yellow().bold(),
            Self::agreement(comparison.agreement)
        );

        for vote in &comparison.per_provider_values {
            output.push_str(&format!(
                "  {:<8} {} ({})\n",
                vote.provider.as_str(),
                vote.value,
                vote.confidence
            ));
        }

        match (&comparison.consensus_value, &comparison.consensus_provider) {
            (Some(value), Some(provider)) => {
                output.push_str(&format!("  {} {} [{}]\n", "=>".cyan(), value, provider));
            }
            _ => output.push_str(&format!("  {} {}\n", "=>".cyan(), "not found".dimmed())),
        }

        output
    }

    fn quote(text: &str) -> String {
        format!("\"{}\"", excerpt(text, QUOTE_PREVIEW))
    }

    fn agreement(agreement: Agreement) -> ColoredString {
        match agreement {
            Agreement::Full => agreement.as_str().green(),
            Agreement::Partial => agreement.as_str().yellow(),
            Agreement::None => agreement.as_str().dimmed(),
        }
    }

    fn session_status(status: SessionStatus) -> ColoredString {
        match status {
            SessionStatus::Completed => status.as_str().green(),
            SessionStatus::Failed => status.as_str().red(),
            _ => status.as_str().normal(),
        }
    }

    fn percent(rate: f64) -> String {
        format!("{:.0}%", rate * 100.0)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, view: &ExtractionView<'_>) -> String {
        Self::format_full(view)
    }

    fn format_consensus(&self, view: &ExtractionView<'_>) -> String {
        Self::format_consensus(view)
    }

    fn format_json(&self, view: &ExtractionView<'_>) -> String {
        Self::format_json(view)
    }
}
