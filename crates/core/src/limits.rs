//! Size limits and business-rule constants for the asset tracker.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so field limits are duplicated there. Keep both in sync when modifying.

// === Notification Limits ===

/// Maximum notification message length (chars).
pub const MAX_NOTIFICATION_MESSAGE_LEN: usize = 1000;

/// Maximum employee code length carried by a notification.
pub const MAX_NOTIFICATION_EMPLOYEE_LEN: usize = 10;

/// Default maximum serialized notification payload (1MB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Smallest payload cap a notifier may be configured with.
pub const MIN_MAX_PAYLOAD_BYTES: usize = 1024;

/// Upper bound for configured notification retries.
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

/// Slack added on top of the notifier's retry budget when sizing the
/// per-job dispatch timeout.
pub const DISPATCH_TIMEOUT_MARGIN_MS: u64 = 1_000;

// === Computer Fields ===

/// Employee abbreviations are exactly three alphanumeric characters.
pub const EMPLOYEE_ABBREVIATION_LEN: usize = 3;

/// Computer name max length.
pub const MAX_COMPUTER_NAME_LEN: usize = 255;

/// Free-text description max length.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

// === Business Rules ===

/// Default number of computers an employee may hold before a warning fires.
pub const DEFAULT_MAX_COMPUTERS_PER_EMPLOYEE: usize = 3;

// === Pagination ===

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MIN_PAGE_SIZE: usize = 1;
pub const MAX_PAGE_SIZE: usize = 100;
