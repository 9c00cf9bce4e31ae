//! Mock Scheduler Implementation
//!
//! In-process [`RemoteClient`] for testing every layer above the client.
//! Counts calls per operation (and per key) so tests can assert exactly how
//! many round-trips a cached or retried read caused.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lava_protocol::{
    Device, DeviceSummary, JobDefinition, JobId, JobListing, JobQuery, JobStatus, TestCase,
    ValidationIssue,
};

use crate::client::{ClientError, ClientResult, Operation, RemoteClient};

use super::failure::{FailureConfig, FailureInjector};
use super::state::{MockJob, MockState};

/// Configurable mock scheduler for testing
#[derive(Clone, Default)]
pub struct MockScheduler {
    /// Mutable state (wrapped for interior mutability)
    state: Arc<Mutex<MockState>>,
    /// Failure injector
    failures: Arc<Mutex<FailureInjector>>,
    /// Calls per operation
    calls: Arc<Mutex<HashMap<Operation, u32>>>,
    /// Calls per (operation, key)
    keyed_calls: Arc<Mutex<HashMap<(Operation, String), u32>>>,
}

impl MockScheduler {
    /// Create a new empty mock scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock scheduler populated with `(hostname, type, health, tags)` devices
    pub fn with_devices(devices: &[(&str, &str, &str, &[&str])]) -> Self {
        let scheduler = Self::new();
        for (hostname, device_type, health, tags) in devices {
            scheduler.add_device(
                DeviceSummary::new(*hostname, *device_type, *health),
                tags.iter().map(|t| t.to_string()).collect(),
            );
        }
        scheduler
    }

    // === Public API for test configuration ===

    /// Add (or replace) a device with its tags
    pub fn add_device(&self, summary: DeviceSummary, tags: Vec<String>) {
        self.state.lock().unwrap().add_device(summary, tags);
    }

    /// Remove a device
    pub fn remove_device(&self, hostname: &str) -> bool {
        self.state.lock().unwrap().remove_device(hostname)
    }

    /// Change the health of a device
    pub fn set_health(&self, hostname: &str, health: &str) -> bool {
        self.state.lock().unwrap().set_health(hostname, health)
    }

    /// Replace the tags of a device
    pub fn set_tags(&self, hostname: &str, tags: &[&str]) {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        let mut state = self.state.lock().unwrap();
        if let Some(detail) = state.details.get_mut(hostname) {
            detail.tags = tags.clone();
        }
        state.tags.insert(hostname.to_string(), tags);
    }

    /// Set the template returned for a device type
    pub fn set_template(&self, device_type: &str, template: &str) {
        self.state
            .lock()
            .unwrap()
            .templates
            .insert(device_type.to_string(), template.to_string());
    }

    /// Set the results returned for a job
    pub fn set_results(&self, id: JobId, results: Vec<TestCase>) {
        self.state.lock().unwrap().results.insert(id, results);
    }

    /// Set the issues the validator reports
    pub fn set_validation_issues(&self, issues: Vec<ValidationIssue>) {
        self.state.lock().unwrap().validation_issues = issues;
    }

    /// Mark a job finished with the given health
    pub fn finish_job(&self, id: JobId, health: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.jobs.get_mut(&id) {
            Some(job) => {
                job.status.state = "Finished".to_string();
                job.status.health = health.to_string();
                job.status.end_time = Some(chrono::Utc::now());
                true
            }
            None => false,
        }
    }

    /// Get a submitted job
    pub fn job(&self, id: JobId) -> Option<MockJob> {
        self.state.lock().unwrap().jobs.get(&id).cloned()
    }

    /// Inject an error for every call to an operation
    pub fn inject_error(&self, op: Operation, error: ClientError) {
        self.failures.lock().unwrap().inject_error(op, error);
    }

    /// Inject a failure configuration for an operation
    pub fn inject_failure(&self, op: Operation, config: FailureConfig) {
        self.failures.lock().unwrap().inject(op, config);
    }

    /// Clear failure injection for an operation
    pub fn clear_failure(&self, op: Operation) {
        self.failures.lock().unwrap().clear_op(&op);
    }

    /// Clear all failure injections
    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Number of calls made to an operation
    pub fn calls(&self, op: Operation) -> u32 {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    /// Number of calls made to an operation for one key
    pub fn calls_for(&self, op: Operation, key: &str) -> u32 {
        self.keyed_calls
            .lock()
            .unwrap()
            .get(&(op, key.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Reset all call counters
    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
        self.keyed_calls.lock().unwrap().clear();
    }

    // === Request handling ===

    /// Record a call and apply any injected failure
    fn begin(&self, op: Operation, key: Option<&str>) -> ClientResult<()> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
        if let Some(key) = key {
            *self
                .keyed_calls
                .lock()
                .unwrap()
                .entry((op, key.to_string()))
                .or_insert(0) += 1;
        }

        // Clone out so the injector lock is not held while sleeping
        let failure = self.failures.lock().unwrap().check(&op).cloned();
        if let Some(config) = failure {
            if let Some(delay) = config.delay {
                std::thread::sleep(delay);
            }
            if let Some(error) = config.error {
                return Err(error);
            }
        }
        Ok(())
    }
}

impl RemoteClient for MockScheduler {
    fn list_devices(&self) -> ClientResult<Vec<DeviceSummary>> {
        self.begin(Operation::ListDevices, None)?;
        Ok(self.state.lock().unwrap().devices.clone())
    }

    fn show_device(&self, hostname: &str) -> ClientResult<Device> {
        self.begin(Operation::ShowDevice, Some(hostname))?;
        self.state
            .lock()
            .unwrap()
            .details
            .get(hostname)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("device {}", hostname)))
    }

    fn list_device_tags(&self, hostname: &str) -> ClientResult<Vec<String>> {
        self.begin(Operation::ListDeviceTags, Some(hostname))?;
        self.state
            .lock()
            .unwrap()
            .tags
            .get(hostname)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("device {}", hostname)))
    }

    fn device_type_template(&self, device_type: &str) -> ClientResult<String> {
        self.begin(Operation::DeviceTypeTemplate, Some(device_type))?;
        self.state
            .lock()
            .unwrap()
            .templates
            .get(device_type)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("device type {}", device_type)))
    }

    fn validate_job(&self, definition: &JobDefinition) -> ClientResult<Vec<ValidationIssue>> {
        self.begin(Operation::ValidateJob, None)?;
        let mut issues = self.state.lock().unwrap().validation_issues.clone();
        if definition.device_type.is_empty() {
            issues.push(ValidationIssue {
                key: "device_type".to_string(),
                message: "required key not provided".to_string(),
            });
        }
        Ok(issues)
    }

    fn submit_job(&self, definition: &JobDefinition) -> ClientResult<Vec<JobId>> {
        self.begin(Operation::SubmitJob, None)?;
        let mut state = self.state.lock().unwrap();
        let id = state.next_job_id();
        state.jobs.insert(id, MockJob::new(id, definition.clone()));
        Ok(vec![id])
    }

    fn show_job(&self, id: JobId) -> ClientResult<JobStatus> {
        self.begin(Operation::ShowJob, Some(&id.to_string()))?;
        self.state
            .lock()
            .unwrap()
            .jobs
            .get(&id)
            .map(|job| job.status.clone())
            .ok_or_else(|| ClientError::not_found(format!("job {}", id)))
    }

    fn job_definition(&self, id: JobId) -> ClientResult<JobDefinition> {
        self.begin(Operation::JobDefinition, Some(&id.to_string()))?;
        self.state
            .lock()
            .unwrap()
            .jobs
            .get(&id)
            .map(|job| job.definition.clone())
            .ok_or_else(|| ClientError::not_found(format!("job {}", id)))
    }

    fn list_jobs(&self, query: &JobQuery) -> ClientResult<Vec<JobListing>> {
        self.begin(Operation::ListJobs, None)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .jobs
            .values()
            .filter(|job| {
                query.state.is_empty() || job.status.state.eq_ignore_ascii_case(&query.state)
            })
            .filter(|job| {
                query.health.is_empty() || job.status.health.eq_ignore_ascii_case(&query.health)
            })
            .skip(query.start as usize)
            .take(query.limit as usize)
            .map(MockJob::listing)
            .collect())
    }

    fn cancel_job(&self, id: JobId) -> ClientResult<()> {
        self.begin(Operation::CancelJob, Some(&id.to_string()))?;
        let mut state = self.state.lock().unwrap();
        let job = state
            .jobs
            .get_mut(&id)
            .ok_or_else(|| ClientError::not_found(format!("job {}", id)))?;
        if !job.status.is_finished() {
            job.status.state = "Canceling".to_string();
        }
        Ok(())
    }

    fn job_results(&self, id: JobId) -> ClientResult<Vec<TestCase>> {
        self.begin(Operation::JobResults, Some(&id.to_string()))?;
        let state = self.state.lock().unwrap();
        if let Some(results) = state.results.get(&id) {
            return Ok(results.clone());
        }
        if state.jobs.contains_key(&id) {
            return Ok(Vec::new());
        }
        Err(ClientError::not_found(format!("job {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lava_protocol::FaultCode;
    use std::time::{Duration, Instant};

    fn sample_definition() -> JobDefinition {
        JobDefinition {
            device_type: "qemu".to_string(),
            job_name: "smoke".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_device_calls_are_counted_per_key() {
        let mock = MockScheduler::with_devices(&[
            ("a", "panda", "Good", &["wifi"]),
            ("b", "panda", "Good", &[]),
        ]);

        assert_eq!(mock.list_devices().unwrap().len(), 2);
        assert_eq!(mock.list_device_tags("a").unwrap(), vec!["wifi".to_string()]);
        mock.list_device_tags("a").unwrap();
        mock.list_device_tags("b").unwrap();

        assert_eq!(mock.calls(Operation::ListDevices), 1);
        assert_eq!(mock.calls(Operation::ListDeviceTags), 3);
        assert_eq!(mock.calls_for(Operation::ListDeviceTags, "a"), 2);
        assert_eq!(mock.calls_for(Operation::ListDeviceTags, "b"), 1);

        mock.reset_calls();
        assert_eq!(mock.calls(Operation::ListDevices), 0);
    }

    #[test]
    fn test_unknown_device_is_not_found() {
        let mock = MockScheduler::new();
        let err = mock.show_device("ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_injected_failure_then_recovery() {
        let mock = MockScheduler::with_devices(&[("a", "qemu", "Good", &[])]);
        mock.inject_failure(
            Operation::ListDevices,
            FailureConfig::transport("connection refused").with_fail_count(1),
        );

        assert!(matches!(
            mock.list_devices(),
            Err(ClientError::Transport(_))
        ));
        assert_eq!(mock.list_devices().unwrap().len(), 1);
    }

    #[test]
    fn test_injected_delay() {
        let mock = MockScheduler::new();
        mock.inject_failure(
            Operation::ListDevices,
            FailureConfig::delay(Duration::from_millis(30)),
        );

        let start = Instant::now();
        mock.list_devices().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_job_lifecycle() {
        let mock = MockScheduler::new();

        let ids = mock.submit_job(&sample_definition()).unwrap();
        assert_eq!(ids, vec![1]);

        let status = mock.show_job(1).unwrap();
        assert_eq!(status.state, "Submitted");
        assert_eq!(status.device_type, "qemu");

        mock.cancel_job(1).unwrap();
        assert_eq!(mock.show_job(1).unwrap().state, "Canceling");

        assert_eq!(mock.job_definition(1).unwrap().job_name, "smoke");
        assert!(mock.job_results(1).unwrap().is_empty());
        assert!(mock.cancel_job(99).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_jobs_filters_and_pages() {
        let mock = MockScheduler::new();
        for _ in 0..3 {
            mock.submit_job(&sample_definition()).unwrap();
        }
        mock.finish_job(2, "Complete");

        let finished = mock
            .list_jobs(&JobQuery {
                state: "finished".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].id, 2);

        let page = mock
            .list_jobs(&JobQuery {
                start: 1,
                limit: 1,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 2);
    }

    #[test]
    fn test_validator_flags_missing_device_type() {
        let mock = MockScheduler::new();
        let issues = mock.validate_job(&JobDefinition::default()).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key, "device_type");

        mock.inject_error(
            Operation::ValidateJob,
            ClientError::fault(FaultCode::Unauthorized, "token expired"),
        );
        assert!(mock.validate_job(&sample_definition()).is_err());
    }
}
