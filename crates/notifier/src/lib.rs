//! Notification client for the asset tracker.
//!
//! Delivers [`Notification`]s to a single HTTP endpoint with validation,
//! payload size enforcement, linear-backoff retries, and cancellation.

pub mod client;
pub mod config;
pub mod error;
pub mod notification;

pub use client::*;
pub use config::*;
pub use error::NotifyError;
pub use notification::*;
