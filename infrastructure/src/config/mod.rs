//! Configuration file loading for quorum-extract
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `QUORUM_EXTRACT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./quorum-extract.toml` or `./.quorum-extract.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/quorum-extract/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAuditConfig, FileConfig, FileExtractionConfig, FileOutputConfig,
    FileOutputFormat, FileProviderConfig, FileProviderKind,
};
pub use loader::ConfigLoader;
