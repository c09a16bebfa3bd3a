//! Test fixtures and request body generators.

use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_MAC: AtomicU32 = AtomicU32::new(1);

/// A MAC address no other fixture in this process has used.
pub fn unique_mac() -> String {
    let n = NEXT_MAC.fetch_add(1, Ordering::Relaxed);
    format!(
        "02:00:{:02X}:{:02X}:{:02X}:{:02X}",
        (n >> 24) & 0xFF,
        (n >> 16) & 0xFF,
        (n >> 8) & 0xFF,
        n & 0xFF
    )
}

/// A valid, unassigned computer body.
pub fn computer(name: &str) -> serde_json::Value {
    serde_json::json!({
        "mac_address": unique_mac(),
        "computer_name": name,
        "ip_address": "192.168.1.10",
        "description": "Test workstation"
    })
}

/// A valid computer body assigned to `employee`.
pub fn assigned_computer(name: &str, employee: &str) -> serde_json::Value {
    let mut body = computer(name);
    body["employee_abbreviation"] = serde_json::Value::String(employee.to_string());
    body
}

/// A body that breaks every field rule at once.
pub fn invalid_computer() -> serde_json::Value {
    serde_json::json!({
        "mac_address": "not-a-mac",
        "computer_name": "",
        "ip_address": "999.1.1.1",
        "employee_abbreviation": "TOOLONG"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::validation::normalize_mac;

    #[test]
    fn test_unique_macs_are_valid_and_distinct() {
        let a = unique_mac();
        let b = unique_mac();
        assert_ne!(a, b);
        assert_eq!(normalize_mac(&a).unwrap(), a);
    }
}
