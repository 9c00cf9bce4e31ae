//! Device records.

use serde::{Deserialize, Serialize};

/// Health value reported for a device that can accept jobs.
pub const HEALTH_GOOD: &str = "good";

/// Case-insensitive comparison of scheduler names, folding the full Unicode
/// range rather than ASCII only.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// One row of the scheduler's device list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Unique device hostname.
    pub hostname: String,
    /// Device type name (e.g. "panda", "qemu").
    #[serde(rename = "type")]
    pub device_type: String,
    /// Scheduler state ("Idle", "Running", ...).
    #[serde(default)]
    pub state: String,
    /// Health ("Good", "Bad", "Maintenance", ...).
    #[serde(default)]
    pub health: String,
    /// Job currently running on the device, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_job: Option<i64>,
    #[serde(default)]
    pub pipeline: bool,
}

impl DeviceSummary {
    /// Create a summary with the given hostname, type and health
    pub fn new(
        hostname: impl Into<String>,
        device_type: impl Into<String>,
        health: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            device_type: device_type.into(),
            state: "Idle".to_string(),
            health: health.into(),
            current_job: None,
            pipeline: true,
        }
    }

    /// Returns true if the device reports health "good" (any case)
    pub fn is_healthy(&self) -> bool {
        eq_ignore_case(&self.health, HEALTH_GOOD)
    }

    /// Returns true if the device type matches `device_type` (any case)
    pub fn is_type(&self, device_type: &str) -> bool {
        eq_ignore_case(&self.device_type, device_type)
    }
}

/// Detailed device record as returned by the device "show" call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub hostname: String,
    pub device_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub has_device_dict: bool,
    #[serde(default)]
    pub health_job: bool,
    /// Worker (dispatcher) host the device is attached to.
    #[serde(default)]
    pub worker: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub health: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_job: Option<i64>,
    #[serde(default)]
    pub pipeline: bool,
}
