//! Core types, validation, and errors for the asset tracker.

pub mod computer;
pub mod error;
pub mod limits;
pub mod pagination;
pub mod validation;

pub use computer::*;
pub use error::{Error, ErrorCode, Result};
pub use pagination::*;
