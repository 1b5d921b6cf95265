use thiserror::Error;

use crate::i18n::{Locale, Text};
use crate::llm::{ProviderError, ProviderErrorKind};

/// Everything that can stop a mentor chat request from getting a model reply
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("malformed request body: {0}")]
    Malformed(String),

    #[error("message is empty")]
    EmptyMessage,

    #[error("message has {len} characters, limit is {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("rate limit exceeded for {identifier}")]
    RateLimited {
        identifier: String,
        retry_after_secs: u64,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ChatError {
    /// The reply shown to the user. Never contains internal error detail.
    pub fn user_message(&self, locale: Locale) -> String {
        match self {
            ChatError::Malformed(_) => Text::InvalidRequest.render(locale).to_string(),
            ChatError::EmptyMessage => Text::EmptyMessage.render(locale).to_string(),
            ChatError::MessageTooLong { .. } => Text::MessageTooLong.render(locale).to_string(),
            ChatError::RateLimited {
                retry_after_secs, ..
            } => Text::RateLimited
                .render(locale)
                .replace("{seconds}", &retry_after_secs.to_string()),
            ChatError::Provider(e) => match e.kind() {
                ProviderErrorKind::RateLimited | ProviderErrorKind::Unavailable => {
                    Text::SystemBusy.render(locale).to_string()
                }
                ProviderErrorKind::NotFound => Text::Maintenance.render(locale).to_string(),
                ProviderErrorKind::Auth => Text::SystemIssue.render(locale).to_string(),
                ProviderErrorKind::InvalidRequest | ProviderErrorKind::Other => {
                    Text::Generic.render(locale).to_string()
                }
            },
        }
    }

    /// Writes the full error to the server log
    pub fn log(&self) {
        match self {
            ChatError::Malformed(_) | ChatError::EmptyMessage | ChatError::MessageTooLong { .. } => {
                tracing::debug!("Rejected mentor chat input: {}", self);
            }
            ChatError::RateLimited { identifier, .. } => {
                tracing::info!(identifier = %identifier, "mentor chat rate limited");
            }
            ChatError::Provider(e) => {
                let kind = e.kind();
                if kind == ProviderErrorKind::Auth {
                    tracing::error!(
                        critical = true,
                        provider = %e.provider,
                        status = ?e.status,
                        code = ?e.code,
                        message = %e.message,
                        "mentor chat failed: provider authentication error, check configuration"
                    );
                } else {
                    tracing::error!(
                        provider = %e.provider,
                        kind = ?kind,
                        status = ?e.status,
                        code = ?e.code,
                        message = %e.message,
                        "mentor chat failed"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_error(status: u16) -> ChatError {
        ChatError::Provider(
            ProviderError::new("gemini", "secret upstream detail").with_status(status),
        )
    }

    #[test]
    fn provider_failures_map_to_distinct_messages() {
        let busy = provider_error(429).user_message(Locale::En);
        let maintenance = provider_error(404).user_message(Locale::En);
        let issue = provider_error(401).user_message(Locale::En);
        let generic = provider_error(418).user_message(Locale::En);

        assert_eq!(busy, Text::SystemBusy.render(Locale::En));
        assert_eq!(maintenance, Text::Maintenance.render(Locale::En));
        assert_eq!(issue, Text::SystemIssue.render(Locale::En));
        assert_eq!(generic, Text::Generic.render(Locale::En));
        assert_eq!(provider_error(403).user_message(Locale::En), issue);
        assert_eq!(provider_error(503).user_message(Locale::En), busy);
    }

    #[test]
    fn user_messages_never_leak_detail() {
        for status in [400, 401, 404, 429, 500] {
            for locale in [Locale::Id, Locale::En] {
                let text = provider_error(status).user_message(locale);
                assert!(!text.contains("secret upstream detail"));
                assert!(!text.contains("gemini"));
            }
        }
    }

    #[test]
    fn rate_limit_message_mentions_retry_after() {
        let err = ChatError::RateLimited {
            identifier: "ip:1.1.1.1".into(),
            retry_after_secs: 60,
        };
        assert!(err.user_message(Locale::Id).contains("60 detik"));
        assert!(err.user_message(Locale::En).contains("60 seconds"));
        assert!(!err.user_message(Locale::En).contains("1.1.1.1"));
    }
}
