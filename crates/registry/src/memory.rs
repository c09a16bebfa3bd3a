//! In-memory registry.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;
use tracker_core::{Computer, Page, Pagination};
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};
use crate::repository::ComputerRepository;

/// Registry keeping every record in a process-local map.
#[derive(Default)]
pub struct InMemoryRegistry {
    computers: RwLock<HashMap<Uuid, Computer>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.computers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sorted<'a>(iter: impl Iterator<Item = &'a Computer>) -> Vec<Computer> {
        let mut items: Vec<Computer> = iter.cloned().collect();
        items.sort_by(|a, b| {
            a.computer_name
                .cmp(&b.computer_name)
                .then_with(|| a.mac_address.cmp(&b.mac_address))
        });
        items
    }

    fn paginate(items: Vec<Computer>, pagination: Pagination) -> Page<Computer> {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit())
            .collect();
        Page { items, total }
    }
}

#[async_trait]
impl ComputerRepository for InMemoryRegistry {
    async fn create(&self, computer: Computer) -> RegistryResult<Computer> {
        let mut computers = self.computers.write();

        if computers
            .values()
            .any(|c| c.mac_address == computer.mac_address)
        {
            return Err(RegistryError::DuplicateMac(computer.mac_address));
        }

        debug!(id = %computer.id, mac = %computer.mac_address, "Stored computer");
        computers.insert(computer.id, computer.clone());
        Ok(computer)
    }

    async fn get(&self, id: Uuid) -> RegistryResult<Computer> {
        self.computers
            .read()
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    async fn get_by_mac(&self, mac_address: &str) -> RegistryResult<Option<Computer>> {
        Ok(self
            .computers
            .read()
            .values()
            .find(|c| c.mac_address == mac_address)
            .cloned())
    }

    async fn mac_exists(&self, mac_address: &str) -> RegistryResult<bool> {
        Ok(self
            .computers
            .read()
            .values()
            .any(|c| c.mac_address == mac_address))
    }

    async fn list(&self, pagination: Pagination) -> RegistryResult<Page<Computer>> {
        let items = Self::sorted(self.computers.read().values());
        Ok(Self::paginate(items, pagination))
    }

    async fn update(&self, id: Uuid, computer: Computer) -> RegistryResult<Computer> {
        let mut computers = self.computers.write();

        if computers
            .values()
            .any(|c| c.id != id && c.mac_address == computer.mac_address)
        {
            return Err(RegistryError::DuplicateMac(computer.mac_address));
        }

        let existing = computers.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        existing.mac_address = computer.mac_address;
        existing.computer_name = computer.computer_name;
        existing.ip_address = computer.ip_address;
        existing.employee_abbreviation = computer.employee_abbreviation;
        existing.description = computer.description;
        existing.updated_at = Utc::now();

        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> RegistryResult<Computer> {
        self.computers
            .write()
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))
    }

    async fn list_by_employee(&self, employee: &str) -> RegistryResult<Vec<Computer>> {
        Ok(Self::sorted(
            self.computers
                .read()
                .values()
                .filter(|c| c.employee_abbreviation == employee),
        ))
    }

    async fn list_by_employee_paginated(
        &self,
        employee: &str,
        pagination: Pagination,
    ) -> RegistryResult<Page<Computer>> {
        let items = self.list_by_employee(employee).await?;
        Ok(Self::paginate(items, pagination))
    }

    async fn count_assigned_to(&self, employee: &str) -> RegistryResult<usize> {
        if employee.is_empty() {
            return Ok(0);
        }
        Ok(self
            .computers
            .read()
            .values()
            .filter(|c| c.employee_abbreviation == employee)
            .count())
    }

    async fn assign_to_employee(&self, id: Uuid, employee: &str) -> RegistryResult<Computer> {
        let mut computers = self.computers.write();
        let computer = computers.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        computer.employee_abbreviation = employee.to_string();
        computer.updated_at = Utc::now();
        Ok(computer.clone())
    }

    async fn remove_from_employee(&self, id: Uuid, employee: &str) -> RegistryResult<Computer> {
        let mut computers = self.computers.write();
        match computers.get_mut(&id) {
            Some(computer) if computer.employee_abbreviation == employee => {
                computer.employee_abbreviation.clear();
                computer.updated_at = Utc::now();
                Ok(computer.clone())
            }
            _ => Err(RegistryError::NotAssigned {
                computer_id: id,
                employee: employee.to_string(),
            }),
        }
    }
}
