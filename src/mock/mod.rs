//! Mock Scheduler Implementation
//!
//! Implements a configurable in-process scheduler for testing the retry,
//! cache and refresh layers. Supports every client operation with failure
//! injection for testing error paths.
//!
//! # Operations
//!
//! - `devices.list`, `devices.show`, `devices.tags.list`: served from a
//!   mutable device table
//! - `device_types.get_template`: per-type template text
//! - `jobs.validate`, `jobs.submit`, `jobs.show`, `jobs.definition`,
//!   `jobs.list`, `jobs.cancel`: a minimal job table
//! - `results.get_testjob_results`: per-job canned results

mod failure;
mod scheduler;
mod state;

pub use failure::{FailureConfig, FailureInjector};
pub use scheduler::MockScheduler;
pub use state::{MockJob, MockState};
