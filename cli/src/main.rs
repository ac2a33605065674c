//! CLI entrypoint for quorum-extract
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use extract_application::{
    AcceptValueUseCase, AuditLogger, CompareUseCase, ExtractionParams, ExtractionStore,
    NoAuditLogger, NoProgress, ProgressNotifier, ProviderSelection, RunExtractionUseCase,
};
use extract_domain::{ExtractionSession, ProviderId, SessionStatus};
use extract_infrastructure::{
    ConfigLoader, FileConfig, FileDocumentSource, InMemoryExtractionStore, JsonlAuditLogger,
    SchemaLoader, build_backends,
};
use extract_presentation::{
    Cli, ConsoleFormatter, ExtractionView, OutputConfig, OutputFormatter, ProgressReporter,
    SimpleProgress,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    info!("Starting quorum-extract");

    // === Configuration ===
    let mut config: FileConfig = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    if let Some(timeout) = cli.timeout {
        config.extraction.timeout_seconds = Some(timeout);
    }
    config.validate()?;

    let output_config = OutputConfig::resolve(
        cli.output.map(Into::into),
        config.output.format,
        config.output.color,
        cli.quiet,
    );
    if !output_config.color {
        colored::control::set_override(false);
    }

    // === Inputs ===
    let (Some(schema_path), Some(document_path)) = (&cli.schema, &cli.document) else {
        bail!("Both --schema and a document path are required");
    };
    let schema = SchemaLoader::load(schema_path)
        .with_context(|| format!("Failed to load schema {}", schema_path.display()))?;
    let document = FileDocumentSource::read(document_path)?;

    // === Dependency Injection ===
    let client = reqwest::Client::builder()
        .user_agent(concat!("quorum-extract/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let backends = build_backends(&config, &client);

    let audit: Arc<dyn AuditLogger> = match &config.audit.path {
        Some(path) => match JsonlAuditLogger::new(path) {
            Some(logger) => Arc::new(logger),
            None => {
                warn!("Audit log disabled: cannot open {}", path.display());
                Arc::new(NoAuditLogger)
            }
        },
        None => Arc::new(NoAuditLogger),
    };

    let store = Arc::new(InMemoryExtractionStore::new());
    let session_id = format!("session-{}", chrono::Utc::now().format("%Y%m%d-%H%M%S"));
    let session = ExtractionSession::new(session_id.as_str(), schema);
    let session_id = session.id.clone();
    store.create_session(session)?;

    let selection = if cli.providers.is_empty() {
        ProviderSelection::from_ids(config.extraction.provider_ids())
    } else {
        ProviderSelection::from_ids(
            cli.providers
                .iter()
                .map(|p| ProviderId::from(p.as_str()))
                .collect(),
        )
    };

    let use_case = RunExtractionUseCase::new(store.clone(), backends)
        .with_params(ExtractionParams::from_timeout_seconds(
            config.extraction.timeout_seconds,
        ))
        .with_audit_logger(audit.clone());

    // === Run ===
    let progress: Box<dyn ProgressNotifier> = if !output_config.show_progress {
        Box::new(NoProgress)
    } else if cli.verbose > 0 {
        Box::new(SimpleProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    let run = use_case
        .run_extraction_with_progress(&session_id, &document, selection, progress.as_ref())
        .await?;

    // === Review ===
    let accept_use_case = AcceptValueUseCase::new(store.clone()).with_audit_logger(audit);
    let mut accepted = BTreeMap::new();
    for arg in &cli.accept {
        match accept_use_case.accept_value(&session_id, &arg.field, arg.acceptance.clone()) {
            Ok(value) => {
                accepted.insert(arg.field.clone(), value);
            }
            Err(e) => eprintln!(
                "{} cannot accept {}: {}",
                "warning:".yellow().bold(),
                arg.field,
                e
            ),
        }
    }

    let report = CompareUseCase::new(store).get_comparison(&session_id)?;

    if let Some(path) = &cli.export {
        std::fs::write(path, ConsoleFormatter::format_report_json(&report))
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    let view = ExtractionView {
        run: &run,
        comparison: &report,
        accepted: &accepted,
    };
    println!("{}", ConsoleFormatter.render(output_config.format, &view));

    if run.overall_status == SessionStatus::Failed {
        bail!("Every provider failed ({} launched)", run.per_provider.len());
    }

    Ok(())
}
