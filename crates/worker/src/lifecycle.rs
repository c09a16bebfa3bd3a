//! Per-computer lifecycle notifications.
//!
//! Every notification sent by the tracker carries a `notification_type`
//! metadata entry so receivers can route on it without parsing messages.

use notifier::{Notification, NotificationLevel, Notifier};
use telemetry::metrics;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use tracker_core::Computer;

/// Kind of event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    ThresholdExceeded,
    ComputerCreated,
    ComputerUpdated,
    ComputerDeleted,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::ThresholdExceeded => "threshold_exceeded",
            NotificationType::ComputerCreated => "computer_created",
            NotificationType::ComputerUpdated => "computer_updated",
            NotificationType::ComputerDeleted => "computer_deleted",
        }
    }

    pub fn level(&self) -> NotificationLevel {
        match self {
            NotificationType::ThresholdExceeded | NotificationType::ComputerDeleted => {
                NotificationLevel::Warning
            }
            NotificationType::ComputerCreated | NotificationType::ComputerUpdated => {
                NotificationLevel::Info
            }
        }
    }

    /// Notification of this type, with its level and type tag set.
    pub fn notification(&self, message: impl Into<String>) -> Notification {
        Notification::new(self.level(), message).with_metadata("notification_type", self.as_str())
    }
}

/// A change to one computer record that assigned-to employees care about.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Created(Computer),
    Reassigned { before: Computer, after: Computer },
    Deleted(Computer),
}

impl LifecycleEvent {
    /// Only computers created with an employee are announced.
    pub fn created(computer: &Computer) -> Option<Self> {
        computer
            .is_assigned()
            .then(|| LifecycleEvent::Created(computer.clone()))
    }

    /// Announced when the assigned employee changed, including to or from none.
    pub fn updated(before: &Computer, after: &Computer) -> Option<Self> {
        (before.employee_abbreviation != after.employee_abbreviation).then(|| {
            LifecycleEvent::Reassigned {
                before: before.clone(),
                after: after.clone(),
            }
        })
    }

    /// Only deletions of assigned computers are announced.
    pub fn deleted(computer: &Computer) -> Option<Self> {
        computer
            .is_assigned()
            .then(|| LifecycleEvent::Deleted(computer.clone()))
    }

    pub fn kind(&self) -> NotificationType {
        match self {
            LifecycleEvent::Created(_) => NotificationType::ComputerCreated,
            LifecycleEvent::Reassigned { .. } => NotificationType::ComputerUpdated,
            LifecycleEvent::Deleted(_) => NotificationType::ComputerDeleted,
        }
    }

    /// The computer as it stands after the event.
    pub fn computer(&self) -> &Computer {
        match self {
            LifecycleEvent::Created(computer) | LifecycleEvent::Deleted(computer) => computer,
            LifecycleEvent::Reassigned { after, .. } => after,
        }
    }

    pub fn to_notification(&self) -> Notification {
        let computer = self.computer();
        let message = match self {
            LifecycleEvent::Created(c) => format!(
                "Computer {} created for employee {}",
                c.computer_name, c.employee_abbreviation
            ),
            LifecycleEvent::Reassigned { before, after } => format!(
                "Computer {} updated (reassigned from {} to {})",
                after.computer_name,
                display_code(&before.employee_abbreviation),
                display_code(&after.employee_abbreviation)
            ),
            LifecycleEvent::Deleted(c) => format!(
                "Computer {} deleted (was assigned to {})",
                c.computer_name, c.employee_abbreviation
            ),
        };

        let notification = self
            .kind()
            .notification(message)
            .with_employee(computer.employee_abbreviation.clone())
            .with_metadata("computer_id", computer.id.to_string())
            .with_metadata("computer_name", computer.computer_name.clone());

        match self {
            LifecycleEvent::Reassigned { before, after } => notification
                .with_metadata("old_employee", before.employee_abbreviation.clone())
                .with_metadata("new_employee", after.employee_abbreviation.clone()),
            _ => notification.with_metadata("mac_address", computer.mac_address.clone()),
        }
    }

    /// Send the notification. Failures are logged and counted, never returned.
    pub async fn deliver(&self, notifier: &dyn Notifier, cancel: &CancellationToken) -> bool {
        let computer = self.computer();
        match notifier.notify(self.to_notification(), cancel).await {
            Ok(()) => {
                metrics().lifecycle_notifications.inc();
                debug!(
                    computer_id = %computer.id,
                    notification_type = self.kind().as_str(),
                    "Lifecycle notification sent"
                );
                true
            }
            Err(e) => {
                error!(
                    computer_id = %computer.id,
                    notification_type = self.kind().as_str(),
                    error = %e,
                    "Lifecycle notification failed"
                );
                false
            }
        }
    }
}

fn display_code(code: &str) -> &str {
    if code.is_empty() {
        "unassigned"
    } else {
        code
    }
}
