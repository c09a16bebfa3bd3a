//! Notification payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracker_core::limits::{MAX_NOTIFICATION_EMPLOYEE_LEN, MAX_NOTIFICATION_MESSAGE_LEN};

use crate::error::NotifyError;

/// Source stamped on notifications that don't name one.
pub const DEFAULT_SOURCE: &str = "asset-tracker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Critical,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationLevel {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => Err(NotifyError::Validation(format!(
                "invalid notification level: {}",
                other
            ))),
        }
    }
}

/// A message for the notification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NotificationLevel,
    #[serde(default)]
    pub employee_abbreviation: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            employee_abbreviation: String::new(),
            message: message.into(),
            timestamp: None,
            source: None,
            metadata: HashMap::new(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn with_employee(mut self, employee: impl Into<String>) -> Self {
        self.employee_abbreviation = employee.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check the notification before it is sent.
    pub fn validate(&self) -> Result<(), NotifyError> {
        if self.message.trim().is_empty() {
            return Err(NotifyError::Validation("message is required".into()));
        }

        let message_len = self.message.chars().count();
        if message_len > MAX_NOTIFICATION_MESSAGE_LEN {
            return Err(NotifyError::Validation(format!(
                "message exceeds maximum length of {} characters (got {})",
                MAX_NOTIFICATION_MESSAGE_LEN, message_len
            )));
        }

        if self.employee_abbreviation.chars().count() > MAX_NOTIFICATION_EMPLOYEE_LEN {
            return Err(NotifyError::Validation(format!(
                "employee abbreviation exceeds maximum length of {} characters",
                MAX_NOTIFICATION_EMPLOYEE_LEN
            )));
        }

        Ok(())
    }

    /// Fill in a missing timestamp and source.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        if self.timestamp.is_none() {
            self.timestamp = Some(now);
        }
        if self.source.is_none() {
            self.source = Some(DEFAULT_SOURCE.to_string());
        }
    }
}
