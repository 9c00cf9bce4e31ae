//! Job definition preparation
//!
//! Fills in what the scheduler needs but callers usually leave out:
//! timeouts, priority and visibility.

mod options;
mod timeouts;

use lava_protocol::JobDefinition;

pub use options::{
    JobOptions, JobTimeouts, Priority, Visibility, DEFAULT_FLASH_DEPLOY_MINUTES,
    DEFAULT_HARDDISK_DEPLOY_MINUTES, DEFAULT_JOB_MINUTES, DEFAULT_KEXEC_DEPLOY_MINUTES,
    DEFAULT_QEMU_MINUTES, DEFAULT_STEP_MINUTES,
};
pub use timeouts::apply_default_timeouts;

/// Apply `options` to a definition ahead of submission
pub fn prepare(definition: &mut JobDefinition, options: &JobOptions) {
    apply_default_timeouts(definition, &options.timeouts);
    definition.priority = options.priority.as_str().to_string();
    definition.visibility = options.visibility.as_str().to_string();
}
