//! CLI command definitions

use clap::{Parser, ValueEnum};
use extract_domain::{Acceptance, OutputFormat as DomainOutputFormat};
use std::path::PathBuf;

/// Output format for extraction results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Provider outcomes plus the field-by-field comparison
    Full,
    /// Only the consensus value per field
    Consensus,
    /// JSON output
    Json,
}

impl From<OutputFormat> for DomainOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => DomainOutputFormat::Full,
            OutputFormat::Consensus => DomainOutputFormat::Consensus,
            OutputFormat::Json => DomainOutputFormat::Json,
        }
    }
}

/// A reviewer decision given on the command line as `FIELD=consensus|PROVIDER`
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptArg {
    pub field: String,
    pub acceptance: Acceptance,
}

impl std::str::FromStr for AcceptArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, choice) = s
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=consensus|PROVIDER, got '{}'", s))?;
        let field = field.trim();
        if field.is_empty() || choice.trim().is_empty() {
            return Err(format!("expected FIELD=consensus|PROVIDER, got '{}'", s));
        }
        let acceptance = match choice.parse() {
            Ok(acceptance) => acceptance,
            Err(never) => match never {},
        };
        Ok(Self {
            field: field.to_string(),
            acceptance,
        })
    }
}

/// CLI arguments for quorum-extract
#[derive(Parser, Debug)]
#[command(name = "quorum-extract")]
#[command(
    author,
    version,
    about = "Multi-provider structured extraction with field-level consensus"
)]
#[command(long_about = r#"
quorum-extract asks several AI providers to extract the same fields from a
document, then compares their answers field by field.

Every provider runs independently: a provider that fails, times out or
returns malformed output is reported but never stops the others. Each
extracted value carries its confidence and the exact quote it came from.

Configuration files are loaded from (in priority order):
1. QUORUM_EXTRACT_* environment variables
2. --config <path>              Explicit config file
3. ./quorum-extract.toml        Project-level config
4. ~/.config/quorum-extract/config.toml   Global config

Example:
  quorum-extract --schema fields.toml trial.txt
  quorum-extract --schema fields.json -p gemini -p claude -o consensus trial.txt
  quorum-extract --schema fields.toml --accept sample_size=claude --export report.json trial.txt
"#)]
pub struct Cli {
    /// Plain-text document to extract from
    #[arg(required_unless_present = "show_config")]
    pub document: Option<PathBuf>,

    /// Schema file listing the fields to extract (.toml or .json)
    #[arg(short, long, value_name = "PATH", required_unless_present = "show_config")]
    pub schema: Option<PathBuf>,

    /// Providers to run (can be specified multiple times; default: all enabled)
    #[arg(short, long = "provider", value_name = "PROVIDER")]
    pub providers: Vec<String>,

    /// Output format (default: from config, else full)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Per-provider timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Accept a value after the run: FIELD=consensus or FIELD=PROVIDER
    #[arg(long, value_name = "FIELD=CHOICE")]
    pub accept: Vec<AcceptArg>,

    /// Write the comparison report as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
