//! Job validation, submission and inspection
//!
//! Submission is never retried: a retried submit that reached the scheduler
//! the first time would queue the job twice. Everything else here is a read
//! (or an idempotent cancel) and goes through the retrier.

use lava_protocol::{JobDefinition, JobId, JobListing, JobQuery, JobStatus, ValidationIssue};
use tracing::{info, warn};

use crate::client::{ClientResult, Operation};
use crate::job::{self, JobOptions};

use super::{LavaTools, ToolsError, ToolsResult};

impl LavaTools {
    /// Ask the scheduler to validate a definition. An empty list means valid.
    pub fn validate_job(&self, definition: &JobDefinition) -> ClientResult<Vec<ValidationIssue>> {
        self.client.validate_job(definition)
    }

    /// Submit a definition as-is and return the first job id.
    pub fn submit_job(&self, definition: &JobDefinition) -> ToolsResult<JobId> {
        let ids = self.client.submit_job(definition)?;
        let id = ids.first().copied().ok_or(ToolsError::NoJobIds)?;
        info!(
            event = "lava.job.submitted",
            job_id = id,
            job_name = %definition.job_name,
            device_type = %definition.device_type,
        );
        Ok(id)
    }

    /// Fill timeouts, priority and visibility from `options`, validate, then
    /// submit.
    ///
    /// Validator issues are fatal here, stricter than a plain
    /// validate-then-submit: a definition with any reported issue is never
    /// submitted, even though the scheduler might still accept it. Only
    /// [`LavaTools::submit_job`] sends a definition unconditionally.
    pub fn launch_job(
        &self,
        mut definition: JobDefinition,
        options: &JobOptions,
    ) -> ToolsResult<JobId> {
        job::prepare(&mut definition, options);

        let issues = self.validate_job(&definition)?;
        if !issues.is_empty() {
            warn!(
                event = "lava.job.rejected",
                job_name = %definition.job_name,
                issues = issues.len(),
            );
            return Err(ToolsError::InvalidJob { issues });
        }

        self.submit_job(&definition)
    }

    /// [`LavaTools::launch_job`] with the options this instance was built with
    pub fn launch_job_with_defaults(&self, definition: JobDefinition) -> ToolsResult<JobId> {
        let options = self.job_options;
        self.launch_job(definition, &options)
    }

    pub fn show_job_with_retry(&self, id: JobId) -> ClientResult<JobStatus> {
        self.retrier
            .fetch(Operation::ShowJob, || self.client.show_job(id))
    }

    pub fn job_definition_with_retry(&self, id: JobId) -> ClientResult<JobDefinition> {
        self.retrier
            .fetch(Operation::JobDefinition, || self.client.job_definition(id))
    }

    pub fn list_jobs_with_retry(&self, query: &JobQuery) -> ClientResult<Vec<JobListing>> {
        self.retrier
            .fetch(Operation::ListJobs, || self.client.list_jobs(query))
    }

    pub fn cancel_job_with_retry(&self, id: JobId) -> ClientResult<()> {
        self.retrier
            .fetch(Operation::CancelJob, || self.client.cancel_job(id))?;
        info!(event = "lava.job.cancel_requested", job_id = id);
        Ok(())
    }
}
