//! Internal telemetry for the asset tracker: tracing setup, component
//! health, and in-process counters.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
