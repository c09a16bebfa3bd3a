//! Background workers for the asset tracker.
//!
//! - Threshold policy (assignment count → warning notification)
//! - Lifecycle notifications (computer created, reassigned, deleted)
//! - Dispatcher (bounded pool running notification work off the request path)
//! - Scheduler (periodic health probes)

pub mod dispatcher;
pub mod lifecycle;
pub mod scheduler;
pub mod threshold;

pub use dispatcher::*;
pub use lifecycle::*;
pub use scheduler::*;
pub use threshold::*;
