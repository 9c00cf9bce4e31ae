//! Mock Scheduler State Management
//!
//! Holds devices, device types, jobs and results for the mock scheduler.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use lava_protocol::{
    Device, DeviceSummary, JobDefinition, JobId, JobListing, JobStatus, TestCase, ValidationIssue,
};

/// A job held by the mock scheduler
#[derive(Debug, Clone)]
pub struct MockJob {
    pub status: JobStatus,
    pub definition: JobDefinition,
}

impl MockJob {
    /// Create a new job in the "Submitted" state
    pub fn new(id: JobId, definition: JobDefinition) -> Self {
        let status = JobStatus {
            id,
            description: definition.job_name.clone(),
            device_type: definition.device_type.clone(),
            state: "Submitted".to_string(),
            health: "Unknown".to_string(),
            submit_time: Some(Utc::now()),
            pipeline: true,
            tags: definition.tags.clone(),
            visibility: definition.visibility.clone(),
            submitter: "mock".to_string(),
            ..Default::default()
        };
        Self { status, definition }
    }

    /// Row for the job list
    pub fn listing(&self) -> JobListing {
        JobListing {
            id: self.status.id,
            description: self.status.description.clone(),
            device_type: self.status.device_type.clone(),
            health: self.status.health.clone(),
            state: self.status.state.clone(),
            submitter: self.status.submitter.clone(),
        }
    }
}

/// Mock scheduler state container
#[derive(Debug, Default)]
pub struct MockState {
    /// Device list in scheduler order
    pub devices: Vec<DeviceSummary>,
    /// Device details by hostname
    pub details: HashMap<String, Device>,
    /// Device tags by hostname
    pub tags: HashMap<String, Vec<String>>,
    /// Device-type templates by type name
    pub templates: HashMap<String, String>,
    /// Jobs by id
    pub jobs: BTreeMap<JobId, MockJob>,
    /// Results by job id
    pub results: HashMap<JobId, Vec<TestCase>>,
    /// Issues reported by the next validate calls
    pub validation_issues: Vec<ValidationIssue>,
    /// Last issued job id
    last_job_id: JobId,
}

impl MockState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next job id
    pub fn next_job_id(&mut self) -> JobId {
        self.last_job_id += 1;
        self.last_job_id
    }

    /// Add (or replace) a device along with its tags
    pub fn add_device(&mut self, summary: DeviceSummary, tags: Vec<String>) {
        let detail = Device {
            hostname: summary.hostname.clone(),
            device_type: summary.device_type.clone(),
            description: format!("{} device", summary.device_type),
            worker: "mock-worker".to_string(),
            tags: tags.clone(),
            state: summary.state.clone(),
            health: summary.health.clone(),
            current_job: summary.current_job,
            pipeline: summary.pipeline,
            ..Default::default()
        };

        self.tags.insert(summary.hostname.clone(), tags);
        self.details.insert(summary.hostname.clone(), detail);

        match self
            .devices
            .iter_mut()
            .find(|d| d.hostname == summary.hostname)
        {
            Some(existing) => *existing = summary,
            None => self.devices.push(summary),
        }
    }

    /// Remove a device entirely
    pub fn remove_device(&mut self, hostname: &str) -> bool {
        let before = self.devices.len();
        self.devices.retain(|d| d.hostname != hostname);
        self.details.remove(hostname);
        self.tags.remove(hostname);
        self.devices.len() != before
    }

    /// Update the health of a device in both list and detail views
    pub fn set_health(&mut self, hostname: &str, health: &str) -> bool {
        let mut found = false;
        if let Some(summary) = self.devices.iter_mut().find(|d| d.hostname == hostname) {
            summary.health = health.to_string();
            found = true;
        }
        if let Some(detail) = self.details.get_mut(hostname) {
            detail.health = health.to_string();
        }
        found
    }
}
