//! Shared HTTP handling for provider requests

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use super::error::ProviderError;

/// Default per-request timeout for the underlying HTTP client in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Builds the HTTP client shared by all providers
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
}

/// Sends the request and decodes a successful JSON body. Non-success statuses
/// become a [`ProviderError`] carrying the status and whatever message and code
/// the upstream error body exposes.
pub async fn execute<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_transport(provider, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::from_transport(provider, e))?;

    if status.is_success() {
        debug!(provider, "received {} bytes", body.len());
        return serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse {} response: {}", provider, e);
            ProviderError::new(provider, format!("unexpected response format: {}", e))
                .with_code("decode")
        });
    }

    let (message, code) = describe_error_body(&body);
    let mut error = ProviderError::new(provider, message).with_status(status.as_u16());
    error.code = code;
    Err(error)
}

// Both Gemini and OpenAI-style APIs answer with {"error": {"message", "code"|"status"}}
fn describe_error_body(body: &str) -> (String, Option<String>) {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let detail = parsed.as_ref().and_then(|v| v.get("error"));

    let message = detail
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(200).collect());

    let code = detail.and_then(|e| {
        ["status", "code", "type"].iter().find_map(|field| match e.get(*field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    });

    (message, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_gemini_error_body() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let (message, code) = describe_error_body(body);
        assert_eq!(message, "Quota exceeded");
        assert_eq!(code.as_deref(), Some("RESOURCE_EXHAUSTED"));
    }

    #[test]
    fn reads_openai_error_body() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let (message, code) = describe_error_body(body);
        assert_eq!(message, "Invalid API Key");
        assert_eq!(code.as_deref(), Some("invalid_api_key"));
    }

    #[test]
    fn plain_text_body_is_kept_as_message() {
        let (message, code) = describe_error_body("Bad Gateway");
        assert_eq!(message, "Bad Gateway");
        assert!(code.is_none());
    }
}
