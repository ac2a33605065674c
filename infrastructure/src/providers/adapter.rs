//! Shared structured-extraction adapter

use async_trait::async_trait;
use extract_application::ports::extraction_backend::{AdapterError, ExtractionBackend};
use extract_domain::{FieldRecords, OutputContract, PromptTemplate, ProviderId};
use std::time::Instant;
use tracing::debug;

/// One rendered extraction request
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub contract: &'a OutputContract,
}

/// Provider wire format: send one request, return the raw answer text
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    fn provider(&self) -> &ProviderId;

    fn model_name(&self) -> &str;

    /// Whether the request carries the contract as a structured-output
    /// constraint. When false the JSON Schema is embedded in the prompt.
    fn native_structured_output(&self) -> bool {
        true
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, AdapterError>;
}

/// [`ExtractionBackend`] built on any [`CompletionTransport`]
pub struct StructuredExtractionAdapter<T: CompletionTransport> {
    transport: T,
}

impl<T: CompletionTransport> StructuredExtractionAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: CompletionTransport> ExtractionBackend for StructuredExtractionAdapter<T> {
    fn provider(&self) -> &ProviderId {
        self.transport.provider()
    }

    fn model_name(&self) -> &str {
        self.transport.model_name()
    }

    async fn extract(
        &self,
        contract: &OutputContract,
        document: &str,
    ) -> Result<FieldRecords, AdapterError> {
        let prompt = if self.transport.native_structured_output() {
            PromptTemplate::extraction_prompt(contract, document)
        } else {
            PromptTemplate::extraction_prompt_with_schema(contract, document)
        };
        let request = CompletionRequest {
            system: PromptTemplate::extraction_system(),
            prompt: &prompt,
            contract,
        };

        let start = Instant::now();
        let raw = self.transport.complete(&request).await?;
        debug!(
            provider = %self.transport.provider(),
            bytes = raw.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Received extraction answer"
        );

        contract
            .validate(&raw)
            .map_err(|e| AdapterError::malformed_output(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract_domain::{
        AdapterErrorKind, Field, FieldValue, SchemaContract, ValueKind,
    };
    use std::sync::Mutex;

    struct FixedTransport {
        provider: ProviderId,
        native: bool,
        answer: Result<String, AdapterError>,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedTransport {
        fn new(answer: Result<String, AdapterError>) -> Self {
            Self {
                provider: ProviderId::Gemini,
                native: true,
                answer,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionTransport for FixedTransport {
        fn provider(&self) -> &ProviderId {
            &self.provider
        }

        fn model_name(&self) -> &str {
            "fixed"
        }

        fn native_structured_output(&self) -> bool {
            self.native
        }

        async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, AdapterError> {
            self.prompts.lock().unwrap().push(request.prompt.to_string());
            self.answer.clone()
        }
    }

    fn contract() -> OutputContract {
        let schema =
            SchemaContract::new(vec![Field::new("sample_size", ValueKind::Integer)]).unwrap();
        OutputContract::compile(&schema)
    }

    const ANSWER: &str = r#"```json
{"sample_size": {"value": 531, "confidence": "high",
  "source_location": {"page": 4, "exact_text_reference": "531 patients"}, "notes": null}}
```"#;

    #[tokio::test]
    async fn test_valid_answer_becomes_records() {
        let adapter = StructuredExtractionAdapter::new(FixedTransport::new(Ok(ANSWER.to_string())));

        let records = adapter.extract(&contract(), "document").await.unwrap();

        assert_eq!(records["sample_size"].value, FieldValue::Integer(531));
        assert_eq!(adapter.provider(), &ProviderId::Gemini);
    }

    #[tokio::test]
    async fn test_contract_violation_is_malformed_output() {
        let adapter = StructuredExtractionAdapter::new(FixedTransport::new(Ok(
            r#"{"enrollment": {"value": 531}}"#.to_string(),
        )));

        let error = adapter.extract(&contract(), "document").await.unwrap_err();

        assert_eq!(error.kind, AdapterErrorKind::MalformedOutput);
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let adapter = StructuredExtractionAdapter::new(FixedTransport::new(Err(
            AdapterError::rate_limited("HTTP 429"),
        )));

        let error = adapter.extract(&contract(), "document").await.unwrap_err();

        assert_eq!(error.kind, AdapterErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn test_schema_embedded_without_native_constraint() {
        let mut transport = FixedTransport::new(Ok(ANSWER.to_string()));
        transport.native = false;
        let adapter = StructuredExtractionAdapter::new(transport);

        adapter.extract(&contract(), "document").await.unwrap();

        let prompts = adapter.transport.prompts.lock().unwrap();
        assert!(prompts[0].contains("JSON Schema"));
    }
}
