//! Provider configuration from TOML (`[providers.<id>]` sections)
//!
//! ```toml
//! [providers.gemini]
//! enabled = true
//! model = "gemini-2.5-flash"
//! api_key_env = "GEMINI_API_KEY"
//!
//! # Any OpenAI-compatible endpoint can be added under its own id
//! [providers.local]
//! kind = "openai"
//! model = "llama3.1"
//! endpoint = "http://localhost:11434/v1"
//! ```

use extract_domain::ProviderId;
use serde::{Deserialize, Serialize};

/// Wire protocol spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileProviderKind {
    Gemini,
    Anthropic,
    OpenAi,
}

/// One provider's settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub enabled: bool,
    /// Wire protocol; implied for the built-in provider ids
    pub kind: Option<FileProviderKind>,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead)
    pub api_key: Option<String>,
    /// Base URL override
    pub endpoint: Option<String>,
    /// Response token limit (Anthropic and OpenAI)
    pub max_tokens: u32,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: None,
            model: String::new(),
            api_key_env: String::new(),
            api_key: None,
            endpoint: None,
            max_tokens: 4096,
        }
    }
}

impl FileProviderConfig {
    /// Defaults for a built-in provider
    pub fn builtin(id: &ProviderId) -> Self {
        let (model, api_key_env) = match id {
            ProviderId::Gemini => ("gemini-2.5-flash", "GEMINI_API_KEY"),
            ProviderId::Claude => ("claude-sonnet-4-5", "ANTHROPIC_API_KEY"),
            ProviderId::OpenAi => ("gpt-4o", "OPENAI_API_KEY"),
            ProviderId::Custom(_) => ("", ""),
        };
        Self {
            model: model.to_string(),
            api_key_env: api_key_env.to_string(),
            ..Self::default()
        }
    }

    /// Explicit kind, or the one implied by a built-in provider id
    pub fn resolved_kind(&self, id: &ProviderId) -> Option<FileProviderKind> {
        self.kind.or(match id {
            ProviderId::Gemini => Some(FileProviderKind::Gemini),
            ProviderId::Claude => Some(FileProviderKind::Anthropic),
            ProviderId::OpenAi => Some(FileProviderKind::OpenAi),
            ProviderId::Custom(_) => None,
        })
    }

    /// API key from `api_key` or the `api_key_env` variable
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| {
                (!self.api_key_env.is_empty())
                    .then(|| std::env::var(&self.api_key_env).ok())
                    .flatten()
            })
            .filter(|key| !key.trim().is_empty())
    }
}
