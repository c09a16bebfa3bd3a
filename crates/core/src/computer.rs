//! Computer asset records and the request body used to create or replace them.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{Error, Result};
use crate::validation::{
    normalize_mac, validate_computer_name, validate_employee_abbreviation, validate_ip,
};

/// A tracked computer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Computer {
    pub id: Uuid,
    /// Normalized `XX:XX:XX:XX:XX:XX`, unique across the registry
    pub mac_address: String,
    pub computer_name: String,
    pub ip_address: String,
    /// Assigned employee; empty when unassigned
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub employee_abbreviation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Computer {
    /// Whether the computer is currently assigned to anyone.
    pub fn is_assigned(&self) -> bool {
        !self.employee_abbreviation.is_empty()
    }
}

/// Request body for creating or replacing a computer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ComputerInput {
    #[serde(default)]
    #[validate(custom(function = "mac_rule"))]
    pub mac_address: String,

    #[serde(default)]
    #[validate(custom(function = "computer_name_rule"))]
    pub computer_name: String,

    #[serde(default)]
    #[validate(custom(function = "ip_rule"))]
    pub ip_address: String,

    #[serde(default)]
    #[validate(custom(function = "employee_rule"))]
    pub employee_abbreviation: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "description cannot exceed 1000 characters"))]
    pub description: String,
}

impl ComputerInput {
    /// Validate every field and normalize the MAC address.
    ///
    /// All violations are reported together.
    pub fn validated(mut self) -> Result<Self> {
        if let Err(errors) = self.validate() {
            return Err(Error::validation_details(flatten_errors(&errors)));
        }
        self.mac_address = normalize_mac(&self.mac_address).map_err(Error::validation)?;
        Ok(self)
    }

    /// Build a new record from validated input.
    pub fn into_computer(self, id: Uuid, now: DateTime<Utc>) -> Computer {
        Computer {
            id,
            mac_address: self.mac_address,
            computer_name: self.computer_name,
            ip_address: self.ip_address,
            employee_abbreviation: self.employee_abbreviation,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

fn rule_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(message));
    err
}

fn mac_rule(value: &str) -> std::result::Result<(), ValidationError> {
    normalize_mac(value)
        .map(|_| ())
        .map_err(|msg| rule_error("mac_address", msg))
}

fn computer_name_rule(value: &str) -> std::result::Result<(), ValidationError> {
    validate_computer_name(value).map_err(|msg| rule_error("computer_name", msg))
}

fn ip_rule(value: &str) -> std::result::Result<(), ValidationError> {
    validate_ip(value).map_err(|msg| rule_error("ip_address", msg))
}

fn employee_rule(value: &str) -> std::result::Result<(), ValidationError> {
    validate_employee_abbreviation(value).map_err(|msg| rule_error("employee_abbreviation", msg))
}

/// Flatten validator output into sorted human-readable messages.
fn flatten_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut details: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    details.sort();
    details
}
