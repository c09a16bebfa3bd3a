//! HTTP notification client with bounded retries.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::{Duration, Instant};
use telemetry::metrics;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::NotifierConfig;
use crate::error::NotifyError;
use crate::notification::Notification;

/// User-Agent sent with every request.
pub const CLIENT_USER_AGENT: &str = "asset-tracker/1.0";

/// Anything that can deliver notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification, giving up when `cancel` fires.
    async fn notify(
        &self,
        notification: Notification,
        cancel: &CancellationToken,
    ) -> Result<(), NotifyError>;

    /// Probe the notification endpoint.
    async fn is_healthy(&self) -> bool;
}

/// Sends notifications to a single HTTP endpoint.
///
/// A send validates the notification, serializes it once and enforces the
/// payload cap, then POSTs it up to `retry_attempts + 1` times. Retry `n`
/// waits `retry_delay * n` before going out.
/// Only transport failures and 5xx responses are retried.
pub struct NotificationClient {
    config: NotifierConfig,
    http: reqwest::Client,
}

impl NotificationClient {
    pub fn new(config: NotifierConfig) -> Result<Self, NotifyError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| NotifyError::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(url = %config.url, retry_attempts = config.retry_attempts, "Notification client ready");

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Send without an external deadline.
    pub async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        self.send_with_cancel(notification, &CancellationToken::new())
            .await
    }

    /// Send, failing with `DeadlineExceeded` once `deadline` elapses.
    pub async fn send_with_timeout(
        &self,
        notification: Notification,
        deadline: Duration,
    ) -> Result<(), NotifyError> {
        match tokio::time::timeout(deadline, self.send(notification)).await {
            Ok(result) => result,
            Err(_) => {
                metrics().notifications_failed.inc();
                Err(NotifyError::DeadlineExceeded(deadline))
            }
        }
    }

    /// Send, aborting the in-flight request or backoff wait when `cancel` fires.
    pub async fn send_with_cancel(
        &self,
        mut notification: Notification,
        cancel: &CancellationToken,
    ) -> Result<(), NotifyError> {
        let payload = match self.prepare(&mut notification) {
            Ok(payload) => payload,
            Err(e) => {
                metrics().notifications_rejected.inc();
                warn!(error = %e, "Notification rejected before sending");
                return Err(e);
            }
        };

        let total_attempts = self.config.total_attempts();
        let started = Instant::now();
        let mut last_error = None;

        for attempt in 1..=total_attempts {
            if attempt > 1 {
                let delay = self.config.retry_delay() * (attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(self.cancelled()),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled()),
                result = self.attempt(payload.clone()) => result,
            };

            match result {
                Ok(()) => {
                    let m = metrics();
                    m.notifications_sent.inc();
                    m.notification_latency_ms
                        .observe(started.elapsed().as_millis() as u64);
                    info!(
                        level = %notification.level,
                        employee = %notification.employee_abbreviation,
                        attempt,
                        "Notification sent"
                    );
                    return Ok(());
                }
                Err(e) if e.is_retriable() => {
                    warn!(attempt, total_attempts, error = %e, "Notification attempt failed");
                    last_error = Some(e);
                }
                Err(e) => {
                    metrics().notifications_failed.inc();
                    warn!(attempt, error = %e, "Notification failed with non-retriable error");
                    return Err(e);
                }
            }
        }

        metrics().notifications_failed.inc();
        let last = last_error
            .unwrap_or_else(|| NotifyError::Transport("no attempt was made".to_string()));
        Err(NotifyError::Exhausted {
            attempts: total_attempts,
            last: Box::new(last),
        })
    }

    /// Validate, stamp, serialize, and size-check.
    fn prepare(&self, notification: &mut Notification) -> Result<Bytes, NotifyError> {
        notification.validate()?;
        notification.stamp(Utc::now());

        let payload = serde_json::to_vec(notification)?;
        if payload.len() > self.config.max_payload_size {
            return Err(NotifyError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        Ok(Bytes::from(payload))
    }

    async fn attempt(&self, payload: Bytes) -> Result<(), NotifyError> {
        metrics().notification_attempts.inc();

        let response = self
            .http
            .post(&self.config.url)
            .timeout(self.config.timeout())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Transport(format!(
                        "request timed out after {:?}",
                        self.config.timeout()
                    ))
                } else {
                    NotifyError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::from_status(status.as_u16(), body));
        }

        if !status.is_success() {
            warn!(status = status.as_u16(), "Unexpected status from notification service");
        }

        Ok(())
    }

    fn cancelled(&self) -> NotifyError {
        metrics().notifications_failed.inc();
        debug!("Notification send cancelled");
        NotifyError::Cancelled
    }
}

#[async_trait]
impl Notifier for NotificationClient {
    async fn notify(
        &self,
        notification: Notification,
        cancel: &CancellationToken,
    ) -> Result<(), NotifyError> {
        self.send_with_cancel(notification, cancel).await
    }

    async fn is_healthy(&self) -> bool {
        let url = self.config.health_url();
        let request = if self.config.health_path.is_some() {
            self.http.get(&url)
        } else {
            self.http.head(&url)
        };

        match request
            .timeout(self.config.timeout())
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await
        {
            Ok(response) => {
                let healthy = response.status().as_u16() < 500;
                debug!(url = %url, status = response.status().as_u16(), healthy, "Notification service probed");
                healthy
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Notification service unreachable");
                false
            }
        }
    }
}
