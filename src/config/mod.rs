//! Tool configuration
//!
//! Parses and validates `lava-tools.toml`, found at
//! `$XDG_CONFIG_HOME/lava-tools.toml` or `~/.config/lava-tools.toml`.
//! Every key is optional; missing keys take the defaults below.
//!
//! ```toml
//! [retry]
//! count = 5
//! delay_seconds = 15
//!
//! [cache]
//! poll_interval_seconds = 300
//! invalid_timeout_seconds = 600
//!
//! [background]
//! prefetching = true
//! interval_seconds = 300
//!
//! [job]
//! priority = "medium"
//! visibility = "public"
//!
//! [job.timeouts]
//! job = 40
//! step = 20
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CachePolicy;
use crate::job::JobOptions;
use crate::retry::{RetryPolicy, DEFAULT_RETRY_COUNT};

/// File name looked up in the config directory
pub const CONFIG_FILE_NAME: &str = "lava-tools.toml";

/// Errors that can occur when loading or validating the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// `[retry]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    /// Extra attempts after the first
    pub count: u32,
    pub delay_seconds: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            count: DEFAULT_RETRY_COUNT,
            delay_seconds: 15,
        }
    }
}

/// `[cache]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub poll_interval_seconds: u64,
    pub invalid_timeout_seconds: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 5 * 60,
            invalid_timeout_seconds: 10 * 60,
        }
    }
}

/// `[background]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSection {
    pub prefetching: bool,
    pub interval_seconds: u64,
}

impl Default for BackgroundSection {
    fn default() -> Self {
        Self {
            prefetching: true,
            interval_seconds: 5 * 60,
        }
    }
}

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub retry: RetrySection,
    pub cache: CacheSection,
    pub background: BackgroundSection,
    pub job: JobOptions,
}

impl ToolsConfig {
    /// Load from the default location
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        Self::load(&path)
    }

    /// Load from the default location, or use defaults if there is no file
    pub fn load_default_or_builtin() -> Result<Self, ConfigError> {
        match Self::load_default() {
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Default config file path
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        resolve_default_path(
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        )
    }

    /// Load from a specific path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ToolsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.invalid_timeout_seconds < self.cache.poll_interval_seconds {
            return Err(ConfigError::invalid(
                "cache.invalid_timeout_seconds",
                format!(
                    "must be at least poll_interval_seconds ({}), got {}",
                    self.cache.poll_interval_seconds, self.cache.invalid_timeout_seconds
                ),
            ));
        }

        if self.background.prefetching && self.background.interval_seconds == 0 {
            return Err(ConfigError::invalid(
                "background.interval_seconds",
                "must be greater than 0 when prefetching is enabled",
            ));
        }

        if self.job.timeouts.job == 0 {
            return Err(ConfigError::invalid(
                "job.timeouts.job",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.count,
            Duration::from_secs(self.retry.delay_seconds),
        )
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(
            Duration::from_secs(self.cache.poll_interval_seconds),
            Duration::from_secs(self.cache.invalid_timeout_seconds),
        )
    }

    /// Background refresh interval, or `None` when prefetching is off
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.background
            .prefetching
            .then(|| Duration::from_secs(self.background.interval_seconds))
    }

    pub fn job_options(&self) -> JobOptions {
        self.job
    }
}

fn resolve_default_path(
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = xdg_config_home.filter(|d| d.is_absolute()) {
        return Ok(dir.join(CONFIG_FILE_NAME));
    }
    let home = home.ok_or_else(|| {
        ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "HOME environment variable not set",
        ))
    })?;
    Ok(home.join(".config").join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Priority, Visibility};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ToolsConfig::parse("").unwrap();
        assert_eq!(config, ToolsConfig::default());

        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.cache_policy(), CachePolicy::default());
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(300)));
        assert_eq!(config.job_options(), JobOptions::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = ToolsConfig::parse(
            r#"
[retry]
count = 2

[background]
prefetching = false

[job]
priority = "high"
visibility = "personal"

[job.timeouts]
qemu = 45
"#,
        )
        .unwrap();

        assert_eq!(config.retry.count, 2);
        assert_eq!(config.retry.delay_seconds, 15);
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.job.priority, Priority::High);
        assert_eq!(config.job.visibility, Visibility::Personal);
        assert_eq!(config.job.timeouts.qemu, 45);
        assert_eq!(config.job.timeouts.step, 20);
    }

    #[test]
    fn test_invalid_timeout_below_poll_interval_rejected() {
        let err = ToolsConfig::parse(
            r#"
[cache]
poll_interval_seconds = 600
invalid_timeout_seconds = 300
"#,
        )
        .unwrap_err();

        match err {
            ConfigError::Invalid { field, .. } => {
                assert_eq!(field, "cache.invalid_timeout_seconds")
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_zero_interval_rejected_only_when_prefetching() {
        let err = ToolsConfig::parse("[background]\ninterval_seconds = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let config =
            ToolsConfig::parse("[background]\nprefetching = false\ninterval_seconds = 0\n")
                .unwrap();
        assert_eq!(config.refresh_interval(), None);
    }

    #[test]
    fn test_unknown_priority_is_parse_error() {
        let err = ToolsConfig::parse("[job]\npriority = \"urgent\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[retry]\ncount = 1\ndelay_seconds = 0").unwrap();

        let config = ToolsConfig::load(file.path()).unwrap();
        assert_eq!(config.retry_policy(), RetryPolicy::new(1, Duration::ZERO));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ToolsConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_default_path_prefers_xdg() {
        let path = resolve_default_path(
            Some(PathBuf::from("/xdg")),
            Some(PathBuf::from("/home/ci")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/xdg/lava-tools.toml"));

        // Relative XDG paths are ignored
        let path = resolve_default_path(
            Some(PathBuf::from("relative")),
            Some(PathBuf::from("/home/ci")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/home/ci/.config/lava-tools.toml"));

        assert!(resolve_default_path(None, None).is_err());
    }
}
