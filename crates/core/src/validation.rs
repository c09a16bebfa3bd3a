//! Input validation for computer records.

use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;

use crate::limits::{EMPLOYEE_ABBREVIATION_LEN, MAX_COMPUTER_NAME_LEN};

/// Canonical MAC address pattern (upper-case, colon separated).
const MAC_PATTERN: &str = r"^([0-9A-F]{2}:){5}[0-9A-F]{2}$";

static MAC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MAC_PATTERN).expect("invalid MAC pattern"));

/// Normalize a MAC address to `XX:XX:XX:XX:XX:XX` and validate it.
///
/// Accepts lower-case input, hyphen separators and stray spaces.
pub fn normalize_mac(mac: &str) -> Result<String, String> {
    let normalized: String = mac
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '-' { ':' } else { c.to_ascii_uppercase() })
        .collect();

    if MAC_REGEX.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(format!("invalid MAC address format: {}", mac))
    }
}

/// Validate an IPv4 or IPv6 address.
pub fn validate_ip(ip: &str) -> Result<(), String> {
    ip.parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| format!("invalid IP address format: {}", ip))
}

/// Validate an employee abbreviation. Empty means unassigned and is accepted.
pub fn validate_employee_abbreviation(abbrev: &str) -> Result<(), String> {
    if abbrev.is_empty() {
        return Ok(());
    }

    if abbrev.chars().count() != EMPLOYEE_ABBREVIATION_LEN {
        return Err(format!(
            "employee abbreviation must be exactly {} characters long",
            EMPLOYEE_ABBREVIATION_LEN
        ));
    }

    if !abbrev.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("employee abbreviation can only contain alphanumeric characters".to_string());
    }

    Ok(())
}

/// Validate a computer name.
pub fn validate_computer_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("computer name is required".to_string());
    }
    if name.chars().count() > MAX_COMPUTER_NAME_LEN {
        return Err(format!(
            "computer name cannot exceed {} characters",
            MAX_COMPUTER_NAME_LEN
        ));
    }
    Ok(())
}
