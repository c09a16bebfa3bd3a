//! Rate limiting middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use telemetry::metrics;
use tracing::{debug, warn};

use crate::extractors::resolve_client_key;
use crate::response::ApiError;
use crate::state::AppState;

/// Seconds a denied client is told to wait.
const RETRY_AFTER_SECS: u64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second
    #[serde(default = "default_rate")]
    pub rate: u32,
    /// Burst size
    #[serde(default = "default_burst")]
    pub burst: u32,
    /// Buckets untouched for this long are dropped by the sweep
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    /// Upper bound on tracked clients
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
    /// Peers allowed to name the real client via forwarding headers
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

fn default_rate() -> u32 {
    100
}

fn default_burst() -> u32 {
    200
}

fn default_idle_ttl_secs() -> u64 {
    600
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

fn default_max_clients() -> usize {
    100_000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            burst: default_burst(),
            idle_ttl_secs: default_idle_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            max_clients: default_max_clients(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl RateLimitConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }

    pub fn validate(&self) -> tracker_core::Result<()> {
        if self.rate == 0 {
            return Err(tracker_core::Error::validation(
                "rate limit must be at least 1 request per second",
            ));
        }
        if self.burst == 0 {
            return Err(tracker_core::Error::validation(
                "rate limit burst must be at least 1",
            ));
        }
        if self.max_clients == 0 {
            return Err(tracker_core::Error::validation(
                "rate limit max_clients must be at least 1",
            ));
        }
        Ok(())
    }
}

struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(burst: u32, now: Instant) -> Self {
        Self {
            tokens: burst as f64,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, now: Instant, rate: u32, burst: u32) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.last_update = now;

        // Replenish tokens
        self.tokens = (self.tokens + elapsed * rate as f64).min(burst as f64);

        // Try to consume a token
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-client token bucket rate limiter.
///
/// One bucket per client key, all sharing the configured rate and burst. A
/// single lock covers lookup, insertion and consumption. Buckets are kept in
/// recency order, so evicting at `max_clients` is constant time.
pub struct RateLimiter {
    buckets: Mutex<LruCache<String, TokenBucket>>,
    config: RateLimitConfig,
    trusted_proxies: Vec<IpAddr>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let trusted_proxies = config
            .trusted_proxies
            .iter()
            .filter_map(|p| match p.trim().parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    warn!(proxy = %p, "Ignoring unparseable trusted proxy address");
                    None
                }
            })
            .collect();

        Self {
            buckets: Mutex::new(LruCache::unbounded()),
            config,
            trusted_proxies,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn trusted_proxies(&self) -> &[IpAddr] {
        &self.trusted_proxies
    }

    /// Check if request is allowed for the given key.
    pub fn admit(&self, key: &str) -> bool {
        self.admit_at(key, Instant::now())
    }

    /// Same as [`admit`](Self::admit) with an explicit clock reading.
    pub fn admit_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.lock();

        let admitted = match buckets.get_mut(key) {
            Some(bucket) => bucket.try_acquire(now, self.config.rate, self.config.burst),
            None => {
                while buckets.len() >= self.config.max_clients {
                    let Some((evicted, _)) = buckets.pop_lru() else {
                        break;
                    };
                    metrics().rate_limit_buckets_evicted.inc();
                    debug!(client = %evicted, "Evicted least recently used rate limit bucket");
                }

                let mut bucket = TokenBucket::new(self.config.burst, now);
                let admitted = bucket.try_acquire(now, self.config.rate, self.config.burst);
                buckets.put(key.to_string(), bucket);
                admitted
            }
        };

        let m = metrics();
        m.rate_limit_buckets.set(buckets.len() as u64);
        if admitted {
            m.requests_admitted.inc();
        } else {
            m.rate_limited_requests.inc();
        }

        admitted
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.buckets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop buckets idle for at least `max_age`. Returns how many were removed.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        self.cleanup_at(max_age, Instant::now())
    }

    pub fn cleanup_at(&self, max_age: Duration, now: Instant) -> usize {
        let mut buckets = self.buckets.lock();

        let idle: Vec<String> = buckets
            .iter()
            .filter(|(_, bucket)| now.saturating_duration_since(bucket.last_update) >= max_age)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &idle {
            buckets.pop(key);
        }

        let removed = idle.len();
        let m = metrics();
        m.rate_limit_buckets.set(buckets.len() as u64);
        m.rate_limit_buckets_evicted.inc_by(removed as u64);
        removed
    }
}

/// Shared rate limiter state.
pub type SharedRateLimiter = Arc<RateLimiter>;

/// Admit or reject the request before it reaches a handler.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = resolve_client_key(&request, state.rate_limiter.trusted_proxies());

    if state.rate_limiter.admit(&key) {
        return next.run(request).await;
    }

    warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
    ApiError::rate_limited("Rate limit exceeded", Some(RETRY_AFTER_SECS)).into_response()
}
