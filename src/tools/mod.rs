//! Caller-facing tooling API
//!
//! [`LavaTools`] offers two flavours of every read:
//!
//! - `*_cached`: served by the [`StalenessCache`], refreshed through the
//!   retrier only when the cached value is older than the poll interval
//! - `*_with_retry`: straight to the scheduler through the retrier
//!
//! plus device-selection predicates built on the cached reads, and job
//! launch helpers.

mod device_types;
mod devices;
mod jobs;
mod results;

use std::sync::Arc;
use std::time::Duration;

use lava_protocol::ValidationIssue;
use tracing::info;

use crate::cache::{CachePolicy, StalenessCache};
use crate::client::{ClientError, RemoteClient};
use crate::config::ToolsConfig;
use crate::job::JobOptions;
use crate::retry::{Retrier, RetryPolicy};

/// Errors returned by composite tool operations
#[derive(Debug, thiserror::Error)]
pub enum ToolsError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Job definition rejected: {}", format_issues(.issues))]
    InvalidJob { issues: Vec<ValidationIssue> },

    #[error("Scheduler accepted the job but returned no job id")]
    NoJobIds,

    #[error("Failed to start background refresher: {0}")]
    Refresher(#[from] std::io::Error),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.key, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ToolsResult<T> = Result<T, ToolsError>;

/// Runtime settings for [`LavaTools`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolsOptions {
    pub retry: RetryPolicy,
    pub cache: CachePolicy,
    /// Background refresh interval; `None` disables prefetching
    pub refresh_interval: Option<Duration>,
    pub job: JobOptions,
}

impl Default for ToolsOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            cache: CachePolicy::default(),
            refresh_interval: Some(crate::refresh::DEFAULT_REFRESH_INTERVAL),
            job: JobOptions::default(),
        }
    }
}

impl From<&ToolsConfig> for ToolsOptions {
    fn from(config: &ToolsConfig) -> Self {
        Self {
            retry: config.retry_policy(),
            cache: config.cache_policy(),
            refresh_interval: config.refresh_interval(),
            job: config.job_options(),
        }
    }
}

/// Resilient access to a LAVA scheduler
pub struct LavaTools {
    client: Arc<dyn RemoteClient>,
    retrier: Retrier,
    cache: StalenessCache,
    job_options: JobOptions,
}

impl LavaTools {
    /// Build the tools over `client`, starting the background refresher if
    /// `options.refresh_interval` is set.
    pub fn new(client: Arc<dyn RemoteClient>, options: ToolsOptions) -> ToolsResult<Self> {
        let retrier = Retrier::new(options.retry);
        let cache = StalenessCache::new(Arc::clone(&client), retrier, options.cache);
        if let Some(interval) = options.refresh_interval {
            cache.start_refresher(interval)?;
        }

        info!(
            event = "lava.tools.ready",
            retry_count = options.retry.count,
            retry_delay_ms = options.retry.delay.as_millis() as u64,
            poll_interval_ms = options.cache.poll_interval.as_millis() as u64,
            invalid_timeout_ms = options.cache.invalid_timeout.as_millis() as u64,
            prefetching = options.refresh_interval.is_some(),
        );

        Ok(Self {
            client,
            retrier,
            cache,
            job_options: options.job,
        })
    }

    pub fn from_config(client: Arc<dyn RemoteClient>, config: &ToolsConfig) -> ToolsResult<Self> {
        Self::new(client, ToolsOptions::from(config))
    }

    pub fn cache(&self) -> &StalenessCache {
        &self.cache
    }

    pub fn retrier(&self) -> &Retrier {
        &self.retrier
    }

    /// Options used by [`LavaTools::launch_job_with_defaults`]
    pub fn job_options(&self) -> &JobOptions {
        &self.job_options
    }

    /// Stop background refreshing. Cached reads keep working.
    pub fn shutdown(&self) {
        self.cache.stop_refresher();
    }
}

impl std::fmt::Debug for LavaTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LavaTools")
            .field("retrier", &self.retrier)
            .field("cache", &self.cache)
            .field("job_options", &self.job_options)
            .finish_non_exhaustive()
    }
}
