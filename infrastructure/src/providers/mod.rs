//! Extraction backends over provider HTTP APIs
//!
//! Every provider is a [`CompletionTransport`] (wire format only) wrapped in
//! the shared [`StructuredExtractionAdapter`], which renders the prompt,
//! sends it and validates the answer against the compiled output contract.
//!
//! ```text
//! OutputContract ──► StructuredExtractionAdapter ──► CompletionTransport
//!                        │                             ├─ GeminiTransport
//!                        │                             ├─ AnthropicTransport
//!                        ◄── FieldRecords / AdapterError └─ OpenAiTransport
//! ```

pub mod adapter;
pub mod anthropic;
pub mod factory;
pub mod gemini;
mod http;
pub mod openai;

pub use adapter::{CompletionRequest, CompletionTransport, StructuredExtractionAdapter};
pub use anthropic::AnthropicTransport;
pub use factory::build_backends;
pub use gemini::GeminiTransport;
pub use openai::OpenAiTransport;

/// Connection settings shared by the HTTP transports
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub model: String,
    pub api_key: Option<String>,
    /// Where the key was expected, for error messages
    pub key_source: String,
    pub base_url: String,
    pub max_tokens: u32,
}

impl HttpSettings {
    pub fn new(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            key_source: String::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_tokens: 4096,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>, key_source: impl Into<String>) -> Self {
        self.api_key = api_key;
        self.key_source = key_source.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}
