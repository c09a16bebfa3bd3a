//! Registry errors.

use thiserror::Error;
use uuid::Uuid;

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("computer {0} not found")]
    NotFound(Uuid),

    #[error("computer with MAC address {0} already exists")]
    DuplicateMac(String),

    #[error("computer {computer_id} is not assigned to employee {employee}")]
    NotAssigned { computer_id: Uuid, employee: String },

    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

impl From<RegistryError> for tracker_core::Error {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) => tracker_core::Error::not_found("computer"),
            RegistryError::DuplicateMac(_) => {
                tracker_core::Error::already_exists("computer with this MAC address")
            }
            RegistryError::NotAssigned { .. } => {
                tracker_core::Error::not_found("computer assignment")
            }
            RegistryError::Unavailable(msg) => tracker_core::Error::database(msg),
        }
    }
}
