//! LAVA Tools - resilient access to a LAVA test scheduler
//!
//! Sits between callers and a flaky, slow scheduler RPC endpoint:
//! failed calls are retried at a fixed interval, device reads are served
//! from a cache with bounded staleness, and a background thread keeps the
//! cache warm. The transport itself is supplied by the caller through
//! [`RemoteClient`].

pub mod cache;
pub mod client;
pub mod config;
pub mod job;
pub mod logging;
pub mod mock;
pub mod refresh;
pub mod retry;
pub mod tools;

pub use cache::{CachePolicy, StalenessCache};
pub use client::{ClientError, ClientResult, Operation, RemoteClient};
pub use config::{ConfigError, ToolsConfig};
pub use job::{JobOptions, JobTimeouts, Priority, Visibility};
pub use logging::{init_logging, LogFormat};
pub use refresh::{RefreshHandle, SweepReport};
pub use retry::{Retrier, RetryPolicy};
pub use tools::{LavaTools, ToolsError, ToolsOptions, ToolsResult};
