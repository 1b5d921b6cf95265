//! Error type shared by all chat providers

use std::time::Duration;

use thiserror::Error;

/// Broad failure classes used for retry and user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Upstream throttled us (429)
    RateLimited,
    /// Model or endpoint does not exist (404)
    NotFound,
    /// Credentials rejected (401/403)
    Auth,
    /// Request rejected as invalid (400/422)
    InvalidRequest,
    /// Server error, timeout or network failure
    Unavailable,
    /// Anything else
    Other,
}

/// Failure reported by a chat provider, carrying the upstream HTTP status if
/// there was one.
#[derive(Debug, Clone, Error)]
#[error("{provider} request failed (status: {status:?}, code: {code:?}): {message}")]
pub struct ProviderError {
    pub provider: String,
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn timed_out(provider: &str, after: Duration) -> Self {
        Self::new(
            provider,
            format!("no response within {:.1}s", after.as_secs_f64()),
        )
        .with_code("timeout")
    }

    pub fn no_providers() -> Self {
        Self::new("router", "no chat provider is configured").with_code("no_providers")
    }

    /// Maps a transport level reqwest failure
    pub fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_decode() {
            "decode"
        } else {
            "transport"
        };
        let mut error = Self::new(provider, err.to_string()).with_code(code);
        error.status = err.status().map(|s| s.as_u16());
        error
    }

    pub fn kind(&self) -> ProviderErrorKind {
        match self.status {
            Some(429) => ProviderErrorKind::RateLimited,
            Some(404) => ProviderErrorKind::NotFound,
            Some(401) | Some(403) => ProviderErrorKind::Auth,
            Some(400) | Some(422) => ProviderErrorKind::InvalidRequest,
            Some(s) if s >= 500 => ProviderErrorKind::Unavailable,
            Some(_) => ProviderErrorKind::Other,
            None => match self.code.as_deref() {
                Some("timeout") | Some("connect") | Some("transport") => {
                    ProviderErrorKind::Unavailable
                }
                _ => ProviderErrorKind::Other,
            },
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ProviderErrorKind::RateLimited | ProviderErrorKind::Unavailable
        )
    }
}
