//! Job definition model.
//!
//! A typed view of the subset of a LAVA job definition this workspace
//! inspects and rewrites. Fields not listed here are not preserved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn is_zero(v: &u32) -> bool {
    *v == 0
}

/// A timeout expressed as any mix of seconds, minutes and hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeout {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub seconds: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub minutes: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub hours: u32,
}

impl Timeout {
    pub fn from_seconds(seconds: u32) -> Self {
        Self { seconds, ..Default::default() }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self { minutes, ..Default::default() }
    }

    /// True when no component is set
    pub fn is_unset(&self) -> bool {
        self.seconds == 0 && self.minutes == 0 && self.hours == 0
    }

    /// Total duration in seconds
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.seconds) + u64::from(self.minutes) * 60 + u64::from(self.hours) * 3600
    }
}

/// Top-level timeouts block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default)]
    pub job: Timeout,
    #[serde(default)]
    pub action: Timeout,
    #[serde(default)]
    pub connection: Timeout,
}

/// Architecture specific settings (QEMU in particular).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, rename = "arch", skip_serializing_if = "String::is_empty")]
    pub architecture: String,
    #[serde(default)]
    pub no_kvm: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub machine: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cpu: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_options: Vec<String>,
}

/// An image referenced by URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, rename = "image_arg", skip_serializing_if = "String::is_empty")]
    pub arguments: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub compression: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub image_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ramdisk {
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub compression: String,
    #[serde(default)]
    pub install_overlay: bool,
    #[serde(default)]
    pub install_modules: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Images {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rootfs: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<Image>,
}

/// `deploy` action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployAction {
    #[serde(default)]
    pub timeout: Timeout,
    /// Deployment method ("tftp", "flasher", "tmpfs", ...).
    pub to: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os: String,
    #[serde(default)]
    pub images: Images,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramdisk: Option<Ramdisk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtb: Option<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoLogin {
    #[serde(default)]
    pub login_prompt: String,
    #[serde(default)]
    pub username: String,
}

/// `boot` action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootAction {
    #[serde(default)]
    pub timeout: Timeout,
    /// Boot method ("u-boot", "qemu", "minimal", ...).
    pub method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_login: Option<AutoLogin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<serde_json::Value>,
}

impl BootAction {
    /// True when an auto-login prompt is configured
    pub fn has_login_prompt(&self) -> bool {
        self.auto_login
            .as_ref()
            .map(|login| !login.login_prompt.is_empty())
            .unwrap_or(false)
    }
}

/// A test definition pulled from a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    pub repository: String,
    #[serde(default)]
    pub from: String,
    pub path: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

/// `test` action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAction {
    #[serde(default)]
    pub timeout: Timeout,
    #[serde(default)]
    pub definitions: Vec<TestDefinition>,
}

/// One entry of the `actions` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Deploy(DeployAction),
    Boot(BootAction),
    Test(TestAction),
}

impl Action {
    pub fn timeout(&self) -> &Timeout {
        match self {
            Action::Deploy(deploy) => &deploy.timeout,
            Action::Boot(boot) => &boot.timeout,
            Action::Test(test) => &test.timeout,
        }
    }
}

/// Notification callback settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notify {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// A job definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    pub device_type: String,
    pub job_name: String,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub timeouts: Timeouts,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<Notify>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Device tags the scheduler must match when picking a device.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
