//! Maximum-computers-per-employee policy.

use notifier::{Notification, Notifier, NotifyError};
use registry::{ComputerRepository, RegistryError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use telemetry::metrics;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracker_core::limits::DEFAULT_MAX_COMPUTERS_PER_EMPLOYEE;

use crate::lifecycle::NotificationType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Assigned-computer count at which a warning goes out
    #[serde(default = "default_max_computers")]
    pub max_computers_per_employee: usize,
}

fn default_max_computers() -> usize {
    DEFAULT_MAX_COMPUTERS_PER_EMPLOYEE
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            max_computers_per_employee: default_max_computers(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("failed to count assigned computers: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to dispatch threshold notification: {0}")]
    Notify(#[from] NotifyError),
}

/// What a single check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdOutcome {
    /// No employee code; nothing was read.
    Skipped,
    BelowThreshold { count: usize },
    Notified { count: usize },
    /// The registry read or the dispatch failed (already logged).
    Failed,
}

/// Warns when an employee holds `threshold` or more computers.
///
/// The count is read from the live registry on every check. Concurrent
/// assignments may each observe the crossing, so duplicate warnings at or
/// above the threshold are possible.
pub struct ThresholdPolicy {
    registry: Arc<dyn ComputerRepository>,
    notifier: Arc<dyn Notifier>,
    threshold: usize,
}

impl ThresholdPolicy {
    pub fn new(
        registry: Arc<dyn ComputerRepository>,
        notifier: Arc<dyn Notifier>,
        config: &ThresholdConfig,
    ) -> Self {
        Self {
            registry,
            notifier,
            threshold: config.max_computers_per_employee,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Run the check. Errors are logged and reported as `Failed`.
    pub async fn check_and_notify(
        &self,
        employee_code: &str,
        cancel: &CancellationToken,
    ) -> ThresholdOutcome {
        if employee_code.is_empty() {
            return ThresholdOutcome::Skipped;
        }

        metrics().threshold_checks.inc();

        match self.evaluate(employee_code, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                metrics().threshold_check_errors.inc();
                error!(employee_code = %employee_code, error = %e, "Threshold check failed");
                ThresholdOutcome::Failed
            }
        }
    }

    async fn evaluate(
        &self,
        employee_code: &str,
        cancel: &CancellationToken,
    ) -> Result<ThresholdOutcome, ThresholdError> {
        let count = self.registry.count_assigned_to(employee_code).await?;

        if count < self.threshold {
            debug!(employee_code = %employee_code, count, threshold = self.threshold, "Below threshold");
            return Ok(ThresholdOutcome::BelowThreshold { count });
        }

        self.notifier
            .notify(self.warning(employee_code, count), cancel)
            .await?;

        metrics().threshold_notifications.inc();
        info!(
            employee_code = %employee_code,
            count,
            threshold = self.threshold,
            "Threshold notification sent"
        );
        Ok(ThresholdOutcome::Notified { count })
    }

    fn warning(&self, employee_code: &str, count: usize) -> Notification {
        NotificationType::ThresholdExceeded
            .notification(format!(
                "Employee {} has {} computers assigned (threshold: {})",
                employee_code, count, self.threshold
            ))
            .with_employee(employee_code)
            .with_metadata("computer_count", count.to_string())
            .with_metadata("threshold", self.threshold.to_string())
    }
}
