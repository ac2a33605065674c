//! Google Gemini `generateContent` transport

use super::HttpSettings;
use super::adapter::{CompletionRequest, CompletionTransport};
use super::http::{json_body, require_key, send_error, text_at};
use async_trait::async_trait;
use extract_application::ports::extraction_backend::AdapterError;
use extract_domain::ProviderId;
use serde_json::{Value, json};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini transport; the API key travels in the `x-goog-api-key` header
pub struct GeminiTransport {
    client: reqwest::Client,
    provider: ProviderId,
    settings: HttpSettings,
}

impl GeminiTransport {
    pub fn new(client: reqwest::Client, provider: ProviderId, settings: HttpSettings) -> Self {
        Self {
            client,
            provider,
            settings,
        }
    }

    fn request_body(request: &CompletionRequest<'_>) -> Value {
        json!({
            "systemInstruction": {"parts": [{"text": request.system}]},
            "contents": [{"role": "user", "parts": [{"text": request.prompt}]}],
            "generationConfig": {
                "temperature": 0.1,
                "responseMimeType": "application/json",
                "responseSchema": request.contract.openapi_schema(),
            },
        })
    }

    fn answer_text(body: &Value) -> Result<String, AdapterError> {
        if let Some(reason) = body
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
        {
            return Err(AdapterError::malformed_output(format!(
                "prompt blocked: {}",
                reason
            )));
        }
        text_at(body, "/candidates/0/content/parts/0/text")
    }
}

#[async_trait]
impl CompletionTransport for GeminiTransport {
    fn provider(&self) -> &ProviderId {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, AdapterError> {
        let key = require_key(&self.settings.api_key, &self.settings.key_source)?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url, self.settings.model
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, key)
            .json(&Self::request_body(request))
            .send()
            .await
            .map_err(send_error)?;

        Self::answer_text(&json_body(response).await?)
    }
}
