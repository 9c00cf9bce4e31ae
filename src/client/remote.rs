//! Remote Client contract
//!
//! Abstracts the scheduler connection. Every method performs exactly one
//! call against the scheduler and blocks until it returns. Implementations
//! must not retry or cache; that is layered on top by the retrier and the
//! staleness cache.

use std::fmt;
use std::time::Duration;

use lava_protocol::{
    Device, DeviceSummary, FaultCode, JobDefinition, JobId, JobListing, JobQuery, JobStatus,
    TestCase, ValidationIssue,
};

/// Scheduler operations reachable through a [`RemoteClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListDevices,
    ShowDevice,
    ListDeviceTags,
    DeviceTypeTemplate,
    ValidateJob,
    SubmitJob,
    ShowJob,
    JobDefinition,
    ListJobs,
    CancelJob,
    JobResults,
}

impl Operation {
    /// Stable name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListDevices => "devices.list",
            Operation::ShowDevice => "devices.show",
            Operation::ListDeviceTags => "devices.tags.list",
            Operation::DeviceTypeTemplate => "device_types.get_template",
            Operation::ValidateJob => "jobs.validate",
            Operation::SubmitJob => "jobs.submit",
            Operation::ShowJob => "jobs.show",
            Operation::JobDefinition => "jobs.definition",
            Operation::ListJobs => "jobs.list",
            Operation::CancelJob => "jobs.cancel",
            Operation::JobResults => "results.get_testjob_results",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by a [`RemoteClient`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Scheduler fault {code}: {message}")]
    Fault { code: FaultCode, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Shorthand for a scheduler fault
    pub fn fault(code: FaultCode, message: impl Into<String>) -> Self {
        ClientError::Fault {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a NOT_FOUND fault
    pub fn not_found(what: impl fmt::Display) -> Self {
        Self::fault(FaultCode::NotFound, format!("{} not found", what))
    }

    /// True if the same call might succeed when repeated
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) | ClientError::Timeout(_) => true,
            ClientError::Fault { code, .. } => matches!(code, FaultCode::Internal),
            ClientError::InvalidResponse(_) => false,
        }
    }

    /// True if the scheduler reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClientError::Fault {
                code: FaultCode::NotFound,
                ..
            }
        )
    }
}

/// Result type for scheduler calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Blocking scheduler client
pub trait RemoteClient: Send + Sync {
    /// List all devices known to the scheduler
    fn list_devices(&self) -> ClientResult<Vec<DeviceSummary>>;

    /// Show one device in detail
    fn show_device(&self, hostname: &str) -> ClientResult<Device>;

    /// List the tags attached to a device
    fn list_device_tags(&self, hostname: &str) -> ClientResult<Vec<String>>;

    /// Fetch the (decoded) template of a device type
    fn device_type_template(&self, device_type: &str) -> ClientResult<String>;

    /// Run the scheduler's validator over a definition
    fn validate_job(&self, definition: &JobDefinition) -> ClientResult<Vec<ValidationIssue>>;

    /// Submit a job; multinode definitions yield several ids
    fn submit_job(&self, definition: &JobDefinition) -> ClientResult<Vec<JobId>>;

    /// Show the state of a job
    fn show_job(&self, id: JobId) -> ClientResult<JobStatus>;

    /// Fetch the definition a job was submitted with
    fn job_definition(&self, id: JobId) -> ClientResult<JobDefinition>;

    /// List jobs matching a filter
    fn list_jobs(&self, query: &JobQuery) -> ClientResult<Vec<JobListing>>;

    /// Request cancellation of a job
    fn cancel_job(&self, id: JobId) -> ClientResult<()>;

    /// Fetch the test results of a job
    fn job_results(&self, id: JobId) -> ClientResult<Vec<TestCase>>;
}
