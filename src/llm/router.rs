use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::error::{ProviderError, ProviderErrorKind};
use super::gemini::GeminiProvider;
use super::http;
use super::openai::OpenAiCompatibleProvider;
use super::provider::{ChatProvider, ProviderRequest};
use super::retry::RetryPolicy;
use crate::config::Config;

/// Reply from the first provider that succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedReply {
    pub response: String,
    pub provider: String,
}

/// Calls providers in a fixed order, falling back to the next one when a
/// provider fails after its retries.
pub struct ModelRouter {
    providers: Vec<Arc<dyn ChatProvider>>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl ModelRouter {
    pub fn new(providers: Vec<Arc<dyn ChatProvider>>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            providers,
            retry,
            timeout,
        }
    }

    /// Gemini first, the OpenAI-compatible fallback second. Providers without
    /// an API key are left out.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = http::build_client()?;
        let mut providers: Vec<Arc<dyn ChatProvider>> = Vec::new();

        if let Some(key) = &config.gemini_api_key {
            providers.push(Arc::new(GeminiProvider::new(
                client.clone(),
                &config.gemini_base_url,
                key,
                &config.gemini_model,
            )));
        }
        if let Some(key) = &config.fallback_api_key {
            providers.push(Arc::new(OpenAiCompatibleProvider::new(
                client,
                &config.fallback_base_url,
                key,
                &config.fallback_model,
            )));
        }

        Ok(Self::new(
            providers,
            RetryPolicy::with_max_retries(config.llm_max_retries),
            config.llm_timeout(),
        ))
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub async fn chat(&self, request: &ProviderRequest) -> Result<RoutedReply, ProviderError> {
        let mut last_error = None;

        for (index, provider) in self.providers.iter().enumerate() {
            let provider = provider.as_ref();
            let name = provider.name();
            let timeout = self.timeout;

            let result = self
                .retry
                .run(name, || async move {
                    match tokio::time::timeout(timeout, provider.chat(request)).await {
                        Ok(result) => result,
                        Err(_) => Err(ProviderError::timed_out(name, timeout)),
                    }
                })
                .await;

            match result {
                Ok(response) => {
                    if index > 0 {
                        info!(provider = name, "served by fallback provider");
                    }
                    return Ok(RoutedReply {
                        response,
                        provider: name.to_string(),
                    });
                }
                Err(e) => {
                    if e.kind() == ProviderErrorKind::Auth {
                        error!(
                            critical = true,
                            provider = name,
                            status = ?e.status,
                            "provider rejected credentials, check API key configuration"
                        );
                    }
                    warn!(
                        provider = name,
                        status = ?e.status,
                        code = ?e.code,
                        message = %e.message,
                        "provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(ProviderError::no_providers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        name: &'static str,
        result: Result<String, ProviderError>,
        delay: Duration,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn ok(name: &'static str, text: &str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Ok(text.to_string()),
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
            })
        }

        fn failing(name: &'static str, status: u16) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Err(ProviderError::new(name, "failed").with_status(status)),
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
            })
        }

        fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Ok("late".to_string()),
                delay,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn chat(&self, _request: &ProviderRequest) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.result.clone()
        }
    }

    fn shared(provider: &Arc<ScriptedProvider>) -> Arc<dyn ChatProvider> {
        provider.clone()
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            system_prompt: String::new(),
            history: Vec::new(),
            message: "hello".into(),
        }
    }

    fn router(providers: Vec<Arc<dyn ChatProvider>>) -> ModelRouter {
        ModelRouter::new(providers, RetryPolicy::immediate(1), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn primary_answers_when_healthy() {
        let primary = ScriptedProvider::ok("primary", "from primary");
        let fallback = ScriptedProvider::ok("fallback", "from fallback");
        let router = router(vec![shared(&primary), shared(&fallback)]);

        let reply = router.chat(&request()).await.unwrap();
        assert_eq!(reply.provider, "primary");
        assert_eq!(reply.response, "from primary");
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_back_when_primary_fails() {
        let primary = ScriptedProvider::failing("primary", 404);
        let fallback = ScriptedProvider::ok("fallback", "from fallback");
        let router = router(vec![shared(&primary), shared(&fallback)]);

        let reply = router.chat(&request()).await.unwrap();
        assert_eq!(
            reply,
            RoutedReply {
                response: "from fallback".into(),
                provider: "fallback".into()
            }
        );
        // 404 is not retried
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_primary_before_falling_back() {
        let primary = ScriptedProvider::failing("primary", 503);
        let fallback = ScriptedProvider::ok("fallback", "ok");
        let router = router(vec![shared(&primary), shared(&fallback)]);

        router.chat(&request()).await.unwrap();
        assert_eq!(primary.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn returns_last_error_when_all_fail() {
        let router = router(vec![
            shared(&ScriptedProvider::failing("primary", 401)),
            shared(&ScriptedProvider::failing("fallback", 429)),
        ]);

        let err = router.chat(&request()).await.unwrap_err();
        assert_eq!(err.provider, "fallback");
        assert_eq!(err.kind(), ProviderErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn empty_router_reports_missing_providers() {
        let err = router(Vec::new()).chat(&request()).await.unwrap_err();
        assert_eq!(err.code.as_deref(), Some("no_providers"));
    }

    #[tokio::test]
    async fn slow_provider_times_out_and_falls_back() {
        let router = ModelRouter::new(
            vec![
                shared(&ScriptedProvider::slow("primary", Duration::from_secs(2))),
                shared(&ScriptedProvider::ok("fallback", "quick")),
            ],
            RetryPolicy::immediate(0),
            Duration::from_millis(50),
        );

        let reply = router.chat(&request()).await.unwrap();
        assert_eq!(reply.provider, "fallback");
    }

    #[test]
    fn from_config_skips_providers_without_keys() {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("secret".into()),
            "FALLBACK_API_KEY" => Some("sk-test".into()),
            _ => None,
        })
        .unwrap();
        let router = ModelRouter::from_config(&config).unwrap();
        assert_eq!(router.provider_names(), vec!["openai-compatible".to_string()]);
    }
}
