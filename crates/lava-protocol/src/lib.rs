//! LAVA Protocol Types
//!
//! Plain data exchanged with a LAVA scheduler: devices, jobs, job
//! definitions and test results. Encoding these on the wire is the job of
//! whatever transport implements the client contract.

pub mod definition;
pub mod device;
pub mod fault;
pub mod job;
pub mod results;

pub use definition::{
    Action, AutoLogin, BootAction, Context, DeployAction, Image, Images, JobDefinition, Notify,
    Ramdisk, TestAction, TestDefinition, Timeout, Timeouts,
};
pub use device::{eq_ignore_case, Device, DeviceSummary, HEALTH_GOOD};
pub use fault::FaultCode;
pub use job::{JobId, JobListing, JobQuery, JobStatus, ValidationIssue};
pub use results::{TestCase, TestCaseMetadata};
