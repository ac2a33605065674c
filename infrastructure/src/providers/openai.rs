//! OpenAI Chat Completions transport
//!
//! Also serves any OpenAI-compatible endpoint configured under a custom
//! provider id.

use super::HttpSettings;
use super::adapter::{CompletionRequest, CompletionTransport};
use super::http::{json_body, require_key, send_error, text_at};
use async_trait::async_trait;
use extract_application::ports::extraction_backend::AdapterError;
use extract_domain::ProviderId;
use serde_json::{Value, json};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Name of the response format sent with every request
const SCHEMA_NAME: &str = "field_extraction";

pub struct OpenAiTransport {
    client: reqwest::Client,
    provider: ProviderId,
    settings: HttpSettings,
}

impl OpenAiTransport {
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
            "max_completion_tokens": self.settings.max_tokens,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.prompt},
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": SCHEMA_NAME,
                    "strict": true,
                    "schema": request.contract.json_schema(),
                },
            },
        })
    }

    fn answer_text(body: &Value) -> Result<String, AdapterError> {
        if let Some(refusal) = body
            .pointer("/choices/0/message/refusal")
            .and_then(Value::as_str)
        {
            return Err(AdapterError::malformed_output(format!(
                "model refused: {}",
                refusal
            )));
        }
        text_at(body, "/choices/0/message/content")
    }
}

#[async_trait]
impl CompletionTransport for OpenAiTransport {
    fn provider(&self) -> &ProviderId {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, AdapterError> {
        let key = require_key(&self.settings.api_key, &self.settings.key_source)?;
        let url = format!("{}/chat/completions", self.settings.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(send_error)?;

        Self::answer_text(&json_body(response).await?)
    }
}
