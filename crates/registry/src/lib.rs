//! Computer asset registry for the asset tracker.
//!
//! The rest of the system only sees the [`ComputerRepository`] trait; the
//! in-memory implementation backs the service and the tests.

pub mod error;
pub mod memory;
pub mod repository;

pub use error::{RegistryError, RegistryResult};
pub use memory::InMemoryRegistry;
pub use repository::ComputerRepository;
