//! Backend construction from configuration

use super::adapter::StructuredExtractionAdapter;
use super::{AnthropicTransport, GeminiTransport, HttpSettings, OpenAiTransport};
use super::{anthropic, gemini, openai};
use crate::config::{FileConfig, FileProviderKind};
use extract_application::ports::extraction_backend::ExtractionBackend;
use std::sync::Arc;
use tracing::{debug, warn};

/// Build one backend per enabled provider, in canonical order
///
/// A provider without an API key is still built; its requests fail with
/// `auth_failure` when launched.
pub fn build_backends(
    config: &FileConfig,
    client: &reqwest::Client,
) -> Vec<Arc<dyn ExtractionBackend>> {
    let mut backends: Vec<Arc<dyn ExtractionBackend>> = Vec::new();

    for (id, provider) in config.enabled_providers() {
        let Some(kind) = provider.resolved_kind(&id) else {
            warn!(provider = %id, "Skipping provider without a kind");
            continue;
        };

        let default_url = match kind {
            FileProviderKind::Gemini => gemini::DEFAULT_BASE_URL,
            FileProviderKind::Anthropic => anthropic::DEFAULT_BASE_URL,
            FileProviderKind::OpenAi => openai::DEFAULT_BASE_URL,
        };
        let api_key = provider.api_key();
        if api_key.is_none() {
            debug!(provider = %id, env = %provider.api_key_env, "No API key configured");
        }
        let settings = HttpSettings::new(
            provider.model.clone(),
            provider.endpoint.as_deref().unwrap_or(default_url),
        )
        .with_api_key(api_key, provider.api_key_env.clone())
        .with_max_tokens(provider.max_tokens);

        let backend: Arc<dyn ExtractionBackend> = match kind {
            FileProviderKind::Gemini => Arc::new(StructuredExtractionAdapter::new(
                GeminiTransport::new(client.clone(), id, settings),
            )),
            FileProviderKind::Anthropic => Arc::new(StructuredExtractionAdapter::new(
                AnthropicTransport::new(client.clone(), id, settings),
            )),
            FileProviderKind::OpenAi => Arc::new(StructuredExtractionAdapter::new(
                OpenAiTransport::new(client.clone(), id, settings),
            )),
        };
        backends.push(backend);
    }

    backends
}
