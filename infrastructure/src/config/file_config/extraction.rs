//! Extraction run configuration from TOML (`[extraction]` section)

use extract_domain::ProviderId;
use serde::{Deserialize, Serialize};

/// Raw extraction configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExtractionConfig {
    /// Bounded wait per agent, in seconds (built-in default when unset)
    pub timeout_seconds: Option<u64>,
    /// Default provider set; empty means every enabled provider
    pub providers: Vec<String>,
}

impl FileExtractionConfig {
    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers
            .iter()
            .map(|p| ProviderId::from(p.as_str()))
            .collect()
    }
}
