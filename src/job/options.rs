//! Options applied to a job definition before it is launched

use serde::{Deserialize, Serialize};

/// Default job timeout in minutes
pub const DEFAULT_JOB_MINUTES: u32 = 40;
/// Default timeout in minutes for a test step or a login-prompt boot
pub const DEFAULT_STEP_MINUTES: u32 = 20;
/// Default timeout in minutes for a QEMU boot
pub const DEFAULT_QEMU_MINUTES: u32 = 30;
/// Default timeout in minutes for a kexec (tftp + ramdisk) deploy
pub const DEFAULT_KEXEC_DEPLOY_MINUTES: u32 = 10;
/// Default timeout in minutes for a harddisk (tftp) deploy or a u-boot boot
pub const DEFAULT_HARDDISK_DEPLOY_MINUTES: u32 = 30;
/// Default timeout in minutes for a flasher deploy
pub const DEFAULT_FLASH_DEPLOY_MINUTES: u32 = 10;

/// Scheduler priority of a launched job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("unknown priority '{}' (expected low, medium or high)", s)),
        }
    }
}

/// Who can see a launched job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Personal,
    Group,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Personal => "personal",
            Visibility::Group => "group",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "personal" => Ok(Visibility::Personal),
            "group" => Ok(Visibility::Group),
            _ => Err(format!(
                "unknown visibility '{}' (expected public, personal or group)",
                s
            )),
        }
    }
}

/// Default action timeouts, in minutes.
///
/// Only used for actions that carry no timeout of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobTimeouts {
    /// Lower bound for the whole job
    pub job: u32,
    pub step: u32,
    pub qemu: u32,
    pub kexec_deploy: u32,
    pub harddisk_deploy: u32,
    pub flash_deploy: u32,
}

impl Default for JobTimeouts {
    fn default() -> Self {
        Self {
            job: DEFAULT_JOB_MINUTES,
            step: DEFAULT_STEP_MINUTES,
            qemu: DEFAULT_QEMU_MINUTES,
            kexec_deploy: DEFAULT_KEXEC_DEPLOY_MINUTES,
            harddisk_deploy: DEFAULT_HARDDISK_DEPLOY_MINUTES,
            flash_deploy: DEFAULT_FLASH_DEPLOY_MINUTES,
        }
    }
}

/// Everything [`crate::LavaTools::launch_job`] fills into a definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOptions {
    pub priority: Priority,
    pub visibility: Visibility,
    pub timeouts: JobTimeouts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_visibility_display_matches_wire_value() {
        assert_eq!(Visibility::Personal.to_string(), "personal");
        assert_eq!("Group".parse::<Visibility>().unwrap(), Visibility::Group);
        assert!("private".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_defaults() {
        let options = JobOptions::default();
        assert_eq!(options.priority, Priority::Medium);
        assert_eq!(options.visibility, Visibility::Public);
        assert_eq!(options.timeouts.job, 40);
        assert_eq!(options.timeouts.step, 20);
        assert_eq!(options.timeouts.qemu, 30);
    }
}
