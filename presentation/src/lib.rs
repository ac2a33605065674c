//! Presentation layer for quorum-extract
//!
//! This crate contains CLI definitions, output formatters
//! and progress reporters.

pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{AcceptArg, Cli, OutputFormat};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use output::formatter::{ExtractionView, OutputFormatter};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
