//! Job status and listing types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scheduler job identifier.
pub type JobId = i64;

/// Job record as returned by the job "show" call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: JobId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub device_type: String,
    /// Hostname of the device the job ran on (empty while queued).
    #[serde(default)]
    pub device: String,
    /// "Submitted", "Scheduled", "Running", "Canceling", "Finished".
    #[serde(default)]
    pub state: String,
    /// "Unknown", "Complete", "Incomplete", "Canceled".
    #[serde(default)]
    pub health: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failure_comment: String,
    #[serde(default)]
    pub health_check: bool,
    #[serde(default)]
    pub pipeline: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub submitter: String,
}

impl JobStatus {
    /// Returns true once the scheduler has finished the job
    pub fn is_finished(&self) -> bool {
        self.state.eq_ignore_ascii_case("finished")
    }
}

/// One row of the scheduler's job list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: JobId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub health: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub submitter: String,
}

/// Filter for the job list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    /// Job state filter (empty = any).
    #[serde(default)]
    pub state: String,
    /// Job health filter (empty = any).
    #[serde(default)]
    pub health: String,
    /// Offset into the result set.
    #[serde(default)]
    pub start: u32,
    /// Maximum number of rows.
    pub limit: u32,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            state: String::new(),
            health: String::new(),
            start: 0,
            limit: 25,
        }
    }
}

/// A single complaint from the scheduler's job validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Path of the offending key in the definition.
    pub key: String,
    pub message: String,
}
