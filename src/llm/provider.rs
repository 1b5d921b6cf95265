use async_trait::async_trait;

use super::error::ProviderError;

/// Speaker of a history entry. Anything that is not exactly `"user"` is
/// treated as the assistant, so callers cannot smuggle in system turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn coerce(raw: &str) -> Self {
        if raw == "user" {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Everything a provider needs for one completion
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

/// A chat completion backend
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short name reported back to callers and written to logs
    fn name(&self) -> &str;

    async fn chat(&self, request: &ProviderRequest) -> Result<String, ProviderError>;
}
