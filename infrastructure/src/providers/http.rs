//! HTTP helpers shared by the provider transports

use extract_application::ports::extraction_backend::AdapterError;
use extract_domain::util::excerpt;
use serde_json::Value;

/// Longest response body quoted in an error message
const BODY_EXCERPT: usize = 300;

/// Map a failed send onto an adapter error
///
/// The URL is dropped from the message: error messages are stored and
/// audited, and some endpoints carry credentials in the URL.
pub(crate) fn send_error(e: reqwest::Error) -> AdapterError {
    let e = e.without_url();
    if e.is_timeout() {
        AdapterError::timeout(format!("request timed out: {}", e))
    } else {
        AdapterError::transport(e.to_string())
    }
}

/// Map a non-success HTTP status onto an adapter error
pub(crate) fn status_error(status: u16, body: &str) -> AdapterError {
    let message = format!("HTTP {}: {}", status, excerpt(body, BODY_EXCERPT));
    match status {
        401 | 403 => AdapterError::auth_failure(message),
        429 => AdapterError::rate_limited(message),
        _ => AdapterError::unknown(message),
    }
}

/// Check the status and decode a JSON body
pub(crate) async fn json_body(response: reqwest::Response) -> Result<Value, AdapterError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status.as_u16(), &body));
    }

    let body = response.text().await.map_err(send_error)?;
    serde_json::from_str(&body).map_err(|e| {
        AdapterError::malformed_output(format!(
            "response body is not JSON ({}): {}",
            e,
            excerpt(&body, BODY_EXCERPT)
        ))
    })
}

/// Extract a string at a JSON pointer
pub(crate) fn text_at(body: &Value, pointer: &str) -> Result<String, AdapterError> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            AdapterError::malformed_output(format!(
                "no answer text at {}: {}",
                pointer,
                excerpt(&body.to_string(), BODY_EXCERPT)
            ))
        })
}

/// Fail fast when no API key is configured
pub(crate) fn require_key<'a>(
    api_key: &'a Option<String>,
    key_source: &str,
) -> Result<&'a str, AdapterError> {
    api_key.as_deref().ok_or_else(|| {
        AdapterError::auth_failure(if key_source.is_empty() {
            "no API key configured".to_string()
        } else {
            format!("API key not set ({})", key_source)
        })
    })
}
