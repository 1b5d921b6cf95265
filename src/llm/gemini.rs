//! Google Gemini `generateContent` provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::error::ProviderError;
use super::http;
use super::provider::{ChatProvider, ProviderRequest, Role};

const API_VERSION: &str = "v1beta";

#[derive(Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
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

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, API_VERSION, self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn text_content<'a>(role: &'static str, text: &'a str) -> Content<'a> {
    Content {
        role: Some(role),
        parts: vec![Part { text }],
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip_all, fields(model = %self.model), level = "debug")]
    async fn chat(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let mut contents: Vec<Content<'_>> = request
            .history
            .iter()
            .map(|m| match m.role {
                Role::User => text_content("user", &m.content),
                Role::Assistant => text_content("model", &m.content),
            })
            .collect();
        contents.push(text_content("user", &request.message));

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system_prompt,
                }],
            },
            contents,
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 800,
            },
        };

        let builder = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body);
        let response: GenerateContentResponse = http::execute(self.name(), builder).await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::new(self.name(), "response contained no text")
                .with_code("empty_response"));
        }
        Ok(text.trim().to_string())
    }
}
