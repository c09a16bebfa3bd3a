//! Notification delivery errors.
//!
//! Retriability is decided by variant: remote 5xx responses and transport
//! failures are retried, everything else ends the send immediately.

use std::time::Duration;
use thiserror::Error;

/// Longest remote response body kept in an error.
const MAX_ERROR_BODY_LEN: usize = 512;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notification itself is malformed.
    #[error("invalid notification: {0}")]
    Validation(String),

    /// The serialized notification exceeds the configured cap.
    #[error("notification payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("failed to serialize notification: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The endpoint answered with a 4xx status.
    #[error("notification service rejected request with status {status}: {body}")]
    RemoteClient { status: u16, body: String },

    /// The endpoint answered with a 5xx status.
    #[error("notification service returned error status {status}: {body}")]
    RemoteServer { status: u16, body: String },

    /// Connection, TLS, or per-attempt timeout failure.
    #[error("failed to send request: {0}")]
    Transport(String),

    #[error("notification send cancelled")]
    Cancelled,

    #[error("notification deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// Every attempt failed with a retriable error.
    #[error("failed to send notification after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<NotifyError>,
    },

    #[error("invalid notifier configuration: {0}")]
    Config(String),
}

impl NotifyError {
    /// Classify a failed HTTP status (>= 400).
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > MAX_ERROR_BODY_LEN {
            let mut cut = MAX_ERROR_BODY_LEN;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }

        if status >= 500 {
            Self::RemoteServer { status, body }
        } else {
            Self::RemoteClient { status, body }
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::RemoteServer { .. } | Self::Transport(_))
    }

    /// Whether the caller gave up (cancellation or overall deadline).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded(_))
    }

    /// Whether the notification was refused before any network call.
    pub fn is_rejected_locally(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::PayloadTooLarge { .. } | Self::Serialization(_)
        )
    }
}
