//! Timeout filling for job definitions
//!
//! Actions without a timeout get one picked from [`JobTimeouts`] by action
//! kind and method. The top-level timeouts are then derived from the
//! actions: the action timeout is the longest single action, and the job
//! and connection timeouts cover all actions back to back (never less than
//! the configured job minimum).

use lava_protocol::{Action, JobDefinition, Timeout, Timeouts};

use super::options::JobTimeouts;

/// Default minutes for an action without a timeout, if its kind has one
fn default_minutes(action: &Action, defaults: &JobTimeouts) -> Option<u32> {
    match action {
        Action::Deploy(deploy) => match deploy.to.as_str() {
            "flasher" => Some(defaults.flash_deploy),
            "tftp" if deploy.ramdisk.as_ref().is_some_and(|r| !r.url.is_empty()) => {
                Some(defaults.kexec_deploy)
            }
            "tftp" => Some(defaults.harddisk_deploy),
            _ => None,
        },
        Action::Boot(boot) => match boot.method.as_str() {
            "u-boot" => Some(defaults.harddisk_deploy),
            "qemu" => Some(defaults.qemu),
            _ if boot.has_login_prompt() => Some(defaults.step),
            _ => None,
        },
        Action::Test(_) => Some(defaults.step),
    }
}

fn timeout_mut(action: &mut Action) -> &mut Timeout {
    match action {
        Action::Deploy(deploy) => &mut deploy.timeout,
        Action::Boot(boot) => &mut boot.timeout,
        Action::Test(test) => &mut test.timeout,
    }
}

/// Fill missing action timeouts and recompute the top-level timeouts.
///
/// Existing action timeouts are left alone. The top-level `timeouts` block
/// is always overwritten.
pub fn apply_default_timeouts(definition: &mut JobDefinition, defaults: &JobTimeouts) {
    for action in definition.actions.iter_mut() {
        if !action.timeout().is_unset() {
            continue;
        }
        if let Some(minutes) = default_minutes(action, defaults) {
            *timeout_mut(action) = Timeout::from_minutes(minutes);
        }
    }

    let mut total: u64 = 0;
    let mut longest: u64 = 0;
    for action in &definition.actions {
        let seconds = action.timeout().total_seconds();
        total = total.saturating_add(seconds);
        longest = longest.max(seconds);
    }

    let job_seconds = total.max(u64::from(defaults.job) * 60);
    let job = Timeout::from_seconds(clamp_u32(job_seconds));

    definition.timeouts = Timeouts {
        job,
        action: Timeout::from_seconds(clamp_u32(longest)),
        connection: job,
    };
}

fn clamp_u32(seconds: u64) -> u32 {
    u32::try_from(seconds).unwrap_or(u32::MAX)
}
