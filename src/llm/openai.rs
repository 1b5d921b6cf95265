//! OpenAI-compatible `/chat/completions` provider (Groq, OpenRouter and friends)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::error::ProviderError;
use super::http;
use super::provider::{ChatProvider, ProviderRequest, Role};

#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    #[instrument(skip_all, fields(model = %self.model), level = "debug")]
    async fn chat(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(WireMessage {
            role: "system",
            content: &request.system_prompt,
        });
        messages.extend(request.history.iter().map(|m| WireMessage {
            role: match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: &m.content,
        }));
        messages.push(WireMessage {
            role: "user",
            content: &request.message,
        });

        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: 0.7,
            max_tokens: 800,
        };

        let builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);
        let response: CompletionResponse = http::execute(self.name(), builder).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::new(self.name(), "response contained no text")
                .with_code("empty_response"));
        }
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::error::ProviderErrorKind;
    use mockito::{Matcher, Server};

    fn request() -> ProviderRequest {
        ProviderRequest {
            system_prompt: "Be gentle.".into(),
            history: Vec::new(),
            message: "Salam".into(),
        }
    }

    fn provider(url: String) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(reqwest::Client::new(), url, "sk-test", "llama-3.3-70b")
    }

    #[tokio::test]
    async fn test_chat_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "llama-3.3-70b",
                "messages": [
                    {"role": "system", "content": "Be gentle."},
                    {"role": "user", "content": "Salam"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":" Waalaikumsalam "}}]}"#)
            .expect(1)
            .create_async()
            .await;

        let reply = provider(server.url()).chat(&request()).await.unwrap();
        assert_eq!(reply, "Waalaikumsalam");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_auth_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#)
            .create_async()
            .await;

        let err = provider(server.url()).chat(&request()).await.unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Auth);
        assert_eq!(err.status, Some(401));
        assert_eq!(err.message, "Invalid API Key");
    }
}
