use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub jwt_secret: String,
    pub rate_limit_window_ms: u64,
    pub rate_limit_requests: u32,
    pub rate_limit_max_keys: usize,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub fallback_api_key: Option<String>,
    pub fallback_model: String,
    pub fallback_base_url: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Only `JWT_SECRET`
    /// is required. Values that do not parse into the field's type, and zero
    /// for the rate limit settings, fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, env::VarError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let secret = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Config {
            server_host: text("SERVER_HOST", "0.0.0.0"),
            server_port: parse_or::<u16>(lookup("SERVER_PORT"), 3000),
            api_base_uri: normalize_base_uri(&text("API_BASE_URI", "/api")),
            jwt_secret: secret("JWT_SECRET").ok_or(env::VarError::NotPresent)?,
            rate_limit_window_ms: parse_positive::<u64>(lookup("RATE_LIMIT_WINDOW_MS"), 60_000),
            rate_limit_requests: parse_positive::<u32>(lookup("RATE_LIMIT_REQUESTS"), 10),
            rate_limit_max_keys: parse_positive::<usize>(lookup("RATE_LIMIT_MAX_KEYS"), 500),
            gemini_api_key: secret("GEMINI_API_KEY"),
            gemini_model: text("GEMINI_MODEL", "gemini-2.0-flash"),
            gemini_base_url: text(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            fallback_api_key: secret("FALLBACK_API_KEY"),
            fallback_model: text("FALLBACK_MODEL", "llama-3.3-70b-versatile"),
            fallback_base_url: text("FALLBACK_BASE_URL", "https://api.groq.com/openai/v1"),
            llm_timeout_secs: parse_positive::<u64>(lookup("LLM_TIMEOUT_SECS"), 30),
            llm_max_retries: parse_or::<u32>(lookup("LLM_MAX_RETRIES"), 2),
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_positive<T: FromStr + PartialEq + Default>(value: Option<String>, default: T) -> T {
    match parse_or(value, T::default()) {
        v if v == T::default() => default,
        v => v,
    }
}

// axum refuses to nest at "/" or at paths with a trailing slash
fn normalize_base_uri(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        "/api".to_string()
    } else {
        format!("/{}", trimmed)
    }
}
