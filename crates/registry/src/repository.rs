//! Read/write contract for computer records.

use async_trait::async_trait;
use tracker_core::{Computer, Page, Pagination};
use uuid::Uuid;

use crate::error::RegistryResult;

/// Storage for computer records.
///
/// Lists are ordered by computer name.
#[async_trait]
pub trait ComputerRepository: Send + Sync {
    /// Insert a new record. Fails with `DuplicateMac` if the MAC is taken.
    async fn create(&self, computer: Computer) -> RegistryResult<Computer>;

    async fn get(&self, id: Uuid) -> RegistryResult<Computer>;

    async fn get_by_mac(&self, mac_address: &str) -> RegistryResult<Option<Computer>>;

    async fn mac_exists(&self, mac_address: &str) -> RegistryResult<bool>;

    async fn list(&self, pagination: Pagination) -> RegistryResult<Page<Computer>>;

    /// Replace every mutable field of an existing record.
    async fn update(&self, id: Uuid, computer: Computer) -> RegistryResult<Computer>;

    async fn delete(&self, id: Uuid) -> RegistryResult<Computer>;

    async fn list_by_employee(&self, employee: &str) -> RegistryResult<Vec<Computer>>;

    async fn list_by_employee_paginated(
        &self,
        employee: &str,
        pagination: Pagination,
    ) -> RegistryResult<Page<Computer>>;

    /// Number of computers currently assigned to `employee`.
    async fn count_assigned_to(&self, employee: &str) -> RegistryResult<usize>;

    /// Assign (or reassign) a computer to `employee`.
    async fn assign_to_employee(&self, id: Uuid, employee: &str) -> RegistryResult<Computer>;

    /// Clear the assignment, but only if the computer belongs to `employee`.
    async fn remove_from_employee(&self, id: Uuid, employee: &str) -> RegistryResult<Computer>;

    /// Cheap liveness probe for health reporting.
    async fn ping(&self) -> bool {
        true
    }
}
