//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod audit;
mod extraction;
mod output;
mod providers;

pub use audit::FileAuditConfig;
pub use extraction::FileExtractionConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use providers::{FileProviderConfig, FileProviderKind};

use extract_domain::ProviderId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("model name cannot be empty (provider: {0})")]
    EmptyModelName(String),

    #[error("provider '{0}' needs a `kind` (gemini, anthropic or openai)")]
    MissingProviderKind(String),

    #[error("providers '{first}' and '{second}' both configure {provider}")]
    DuplicateProvider {
        provider: String,
        first: String,
        second: String,
    },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Run control
    pub extraction: FileExtractionConfig,
    /// Per-provider settings, keyed by provider id
    pub providers: BTreeMap<String, FileProviderConfig>,
    /// Output settings
    pub output: FileOutputConfig,
    /// Audit trail settings
    pub audit: FileAuditConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        let providers = ProviderId::builtin()
            .iter()
            .map(|id| (id.to_string(), FileProviderConfig::builtin(id)))
            .collect();

        Self {
            extraction: FileExtractionConfig::default(),
            providers,
            output: FileOutputConfig::default(),
            audit: FileAuditConfig::default(),
        }
    }
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.extraction.timeout_seconds == Some(0) {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        // Aliases ("google", "anthropic") map onto the same provider id
        let mut seen: HashMap<ProviderId, &str> = HashMap::new();
        for (key, _) in self.providers.iter().filter(|(_, p)| p.enabled) {
            let id = ProviderId::from(key.as_str());
            if let Some(first) = seen.insert(id.clone(), key) {
                return Err(ConfigValidationError::DuplicateProvider {
                    provider: id.to_string(),
                    first: first.to_string(),
                    second: key.clone(),
                });
            }
        }

        for (name, provider) in self.enabled_providers() {
            if provider.model.trim().is_empty() {
                return Err(ConfigValidationError::EmptyModelName(name.to_string()));
            }
            if provider.resolved_kind(&name).is_none() {
                return Err(ConfigValidationError::MissingProviderKind(name.to_string()));
            }
        }

        Ok(())
    }

    /// Enabled providers in canonical order
    pub fn enabled_providers(&self) -> Vec<(ProviderId, &FileProviderConfig)> {
        let mut enabled: Vec<(ProviderId, &FileProviderConfig)> = self
            .providers
            .iter()
            .filter(|(_, p)| p.enabled)
            .map(|(name, p)| (ProviderId::from(name.as_str()), p))
            .collect();
        enabled.sort_by(|a, b| a.0.cmp(&b.0));
        enabled
    }
}
