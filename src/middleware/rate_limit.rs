use std::time::Duration;

use axum::http::HeaderMap;

use crate::{cache::ExpiringLruCache, config::Config};

/// Outcome of a single rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub success: bool,
    pub remaining: u32,
}

/// Sliding-window request counter keyed by identifier.
///
/// Each identifier keeps the timestamps of its accepted requests. A check
/// counts only the timestamps inside `[now - interval, now]`, so budget is
/// returned one request at a time as each timestamp ages out.
///
/// The read and the write of a check are separate cache operations. Two
/// concurrent checks for the same identifier can both read the old list and
/// both be accepted. Limits are also per process: every instance behind a
/// load balancer keeps its own counters.
pub struct RateLimiter {
    interval_ms: i64,
    cache: ExpiringLruCache<String, Vec<i64>>,
}

impl RateLimiter {
    pub fn new(interval: Duration, unique_token_per_interval: usize) -> Self {
        Self {
            interval_ms: i64::try_from(interval.as_millis()).unwrap_or(i64::MAX),
            cache: ExpiringLruCache::new(unique_token_per_interval, interval),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rate_limit_window(), config.rate_limit_max_keys)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(0) as u64)
    }

    pub fn check(&self, limit: u32, identifier: &str) -> RateLimitDecision {
        self.check_at(limit, identifier, chrono::Utc::now().timestamp_millis())
    }

    /// Same as [`RateLimiter::check`] with an explicit clock reading in epoch
    /// milliseconds.
    pub fn check_at(&self, limit: u32, identifier: &str, now_ms: i64) -> RateLimitDecision {
        let key = identifier.to_string();
        let window_start = now_ms.saturating_sub(self.interval_ms);

        let stored = self.cache.get(&key, now_ms).unwrap_or_default();
        let stored_len = stored.len();
        let mut timestamps: Vec<i64> = stored
            .into_iter()
            .filter(|&t| t >= window_start && t <= now_ms)
            .collect();

        if timestamps.len() >= limit as usize {
            if timestamps.len() != stored_len {
                self.cache.set(key, timestamps, now_ms);
            }
            tracing::debug!(identifier, limit, "rate limit exceeded");
            return RateLimitDecision {
                success: false,
                remaining: 0,
            };
        }

        timestamps.push(now_ms);
        let remaining = limit.saturating_sub(timestamps.len() as u32);
        self.cache.set(key, timestamps, now_ms);

        RateLimitDecision {
            success: true,
            remaining,
        }
    }

    /// Number of identifiers currently tracked
    pub fn tracked(&self) -> usize {
        self.cache.len()
    }
}

/// Resolves the rate limit partition key for a request.
///
/// Authenticated callers are keyed by user id. Guests are keyed by the first
/// `x-forwarded-for` address, then `x-real-ip`, then the literal `unknown`.
/// Nothing from the request body takes part, so a client cannot get a fresh
/// budget by changing its display name.
pub fn resolve_identifier(user_id: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(user_id) = user_id.map(str::trim).filter(|id| !id.is_empty()) {
        return format!("user:{}", user_id);
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let ip = header("x-forwarded-for")
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| header("x-real-ip"))
        .unwrap_or("unknown");

    format!("ip:{}", ip)
}
