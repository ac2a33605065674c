//! Anthropic Messages API transport

use super::HttpSettings;
use super::adapter::{CompletionRequest, CompletionTransport};
use super::http::{json_body, require_key, send_error, text_at};
use async_trait::async_trait;
use extract_application::ports::extraction_backend::AdapterError;
use extract_domain::ProviderId;
use serde_json::{Value, json};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";

/// Anthropic transport
///
/// The Messages API has no response-schema constraint, so the schema is
/// embedded in the prompt and the answer may come back wrapped in a code
/// fence (the contract validator strips it).
pub struct AnthropicTransport {
    client: reqwest::Client,
    provider: ProviderId,
    settings: HttpSettings,
}

impl AnthropicTransport {
    pub fn new(client: reqwest::Client, provider: ProviderId, settings: HttpSettings) -> Self {
        Self {
            client,
            provider,
            settings,
        }
    }

    fn request_body(&self, request: &CompletionRequest<'_>) -> Value {
        json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "temperature": 0.1,
            "system": request.system,
            "messages": [{"role": "user", "content": request.prompt}],
        })
    }

    fn answer_text(body: &Value) -> Result<String, AdapterError> {
        if body.get("stop_reason").and_then(Value::as_str) == Some("max_tokens") {
            return Err(AdapterError::malformed_output(
                "answer truncated at max_tokens",
            ));
        }
        text_at(body, "/content/0/text")
    }
}

#[async_trait]
impl CompletionTransport for AnthropicTransport {
    fn provider(&self) -> &ProviderId {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }

    fn native_structured_output(&self) -> bool {
        false
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, AdapterError> {
        let key = require_key(&self.settings.api_key, &self.settings.key_source)?;
        let url = format!("{}/v1/messages", self.settings.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(send_error)?;

        Self::answer_text(&json_body(response).await?)
    }
}
