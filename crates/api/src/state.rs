//! Application state shared across handlers.

use registry::ComputerRepository;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use worker::NotificationDispatcher;

use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Computer records (in-memory in this build, mock in tests)
    pub registry: Arc<dyn ComputerRepository>,
    /// Queues threshold checks off the request path
    pub dispatcher: NotificationDispatcher,
    /// Rate limiter
    pub rate_limiter: SharedRateLimiter,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn ComputerRepository>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self::with_rate_limit(registry, dispatcher, RateLimitConfig::default())
    }

    /// Create with custom rate limit config.
    pub fn with_rate_limit(
        registry: Arc<dyn ComputerRepository>,
        dispatcher: NotificationDispatcher,
        rate_config: RateLimitConfig,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            rate_limiter: Arc::new(RateLimiter::new(rate_config)),
        }
    }

    /// Start the rate limiter cleanup background task.
    pub fn start_rate_limiter_cleanup(
        &self,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let rate_limiter = self.rate_limiter.clone();
        let every = rate_limiter.config().cleanup_interval();
        let max_idle = rate_limiter.config().idle_ttl();

        info!(
            interval_secs = every.as_secs(),
            idle_ttl_secs = max_idle.as_secs(),
            "Started rate limiter cleanup task"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    _ = interval.tick() => {
                        let removed = rate_limiter.cleanup(max_idle);
                        if removed > 0 {
                            debug!(removed, remaining = rate_limiter.len(), "Evicted idle rate limit buckets");
                        }
                    }
                }
            }
        })
    }
}
