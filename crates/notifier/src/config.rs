//! Notification client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracker_core::limits::{DEFAULT_MAX_PAYLOAD_BYTES, MAX_RETRY_ATTEMPTS, MIN_MAX_PAYLOAD_BYTES};
use url::Url;

use crate::error::NotifyError;

/// Notification endpoint configuration. Immutable once a client is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Endpoint receiving POSTed notifications
    #[serde(default)]
    pub url: String,
    /// Per-attempt request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after the first attempt (0-10)
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Base retry delay in milliseconds, multiplied by the attempt number
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Maximum serialized payload size in bytes
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,
    /// Health probe sub-path (e.g. "/health"); HEAD on `url` when unset
    #[serde(default)]
    pub health_path: Option<String>,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_max_payload_size() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: default_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            max_payload_size: default_max_payload_size(),
            health_path: None,
        }
    }
}

impl NotifierConfig {
    /// Default configuration for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Total number of delivery attempts.
    pub fn total_attempts(&self) -> u32 {
        self.retry_attempts + 1
    }

    /// Longest a single `send` can take when every attempt runs to its
    /// timeout: all attempt timeouts plus the linear backoff waits.
    pub fn delivery_budget(&self) -> Duration {
        let retries = self.retry_attempts as u64;
        let backoff_steps = retries * (retries + 1) / 2;
        self.timeout() * self.total_attempts() + self.retry_delay() * backoff_steps as u32
    }

    /// URL probed by the health check.
    pub fn health_url(&self) -> String {
        match &self.health_path {
            Some(path) => format!(
                "{}/{}",
                self.url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => self.url.clone(),
        }
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), NotifyError> {
        if self.url.is_empty() {
            return Err(NotifyError::Config(
                "notification service URL is required".into(),
            ));
        }

        let parsed = Url::parse(&self.url)
            .map_err(|e| NotifyError::Config(format!("invalid notification URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NotifyError::Config(format!(
                "unsupported notification URL scheme: {}",
                parsed.scheme()
            )));
        }

        if self.timeout_ms == 0 {
            return Err(NotifyError::Config("timeout must be positive".into()));
        }

        if self.retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(NotifyError::Config(format!(
                "retry_attempts must be between 0 and {}",
                MAX_RETRY_ATTEMPTS
            )));
        }

        if self.max_payload_size < MIN_MAX_PAYLOAD_BYTES {
            return Err(NotifyError::Config(format!(
                "max_payload_size must be at least {} bytes",
                MIN_MAX_PAYLOAD_BYTES
            )));
        }

        Ok(())
    }
}
