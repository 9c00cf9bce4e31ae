//! Failure Injection for the Mock Scheduler
//!
//! Supports configurable failure injection for testing retry and staleness
//! paths.

use std::collections::HashMap;
use std::time::Duration;

use lava_protocol::FaultCode;

use crate::client::{ClientError, Operation};

/// Failure configuration for an operation
#[derive(Debug, Clone)]
pub struct FailureConfig {
    /// Error to return (if any)
    pub error: Option<ClientError>,
    /// Delay to add before responding
    pub delay: Option<Duration>,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Create a config that returns an error
    pub fn error(error: ClientError) -> Self {
        Self {
            error: Some(error),
            delay: None,
            fail_count: None,
        }
    }

    /// Create a config that returns a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::error(ClientError::Transport(message.into()))
    }

    /// Create a config that returns a scheduler fault
    pub fn fault(code: FaultCode, message: impl Into<String>) -> Self {
        Self::error(ClientError::fault(code, message))
    }

    /// Create a config that just adds delay
    pub fn delay(duration: Duration) -> Self {
        Self {
            error: None,
            delay: Some(duration),
            fail_count: None,
        }
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Failure injector for the mock scheduler
#[derive(Debug, Default)]
pub struct FailureInjector {
    /// Per-operation failure configs
    configs: HashMap<Operation, FailureConfig>,
    /// Call counts per operation since injection (for fail_count tracking)
    call_counts: HashMap<Operation, u32>,
}

impl FailureInjector {
    /// Create a new failure injector
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure for an operation
    pub fn inject(&mut self, op: Operation, config: FailureConfig) {
        self.configs.insert(op, config);
        self.call_counts.insert(op, 0);
    }

    /// Inject an error for an operation
    pub fn inject_error(&mut self, op: Operation, error: ClientError) {
        self.inject(op, FailureConfig::error(error));
    }

    /// Inject a delay for an operation
    pub fn inject_delay(&mut self, op: Operation, delay: Duration) {
        self.inject(op, FailureConfig::delay(delay));
    }

    /// Clear all failure injections
    pub fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    /// Clear failure injection for a specific operation
    pub fn clear_op(&mut self, op: &Operation) {
        self.configs.remove(op);
        self.call_counts.remove(op);
    }

    /// Check if a failure should occur for an operation
    /// Returns the failure config if one should occur, None otherwise
    pub fn check(&mut self, op: &Operation) -> Option<&FailureConfig> {
        let config = self.configs.get(op)?;
        let count = self.call_counts.entry(*op).or_insert(0);
        *count += 1;

        if let Some(fail_limit) = config.fail_count {
            if *count > fail_limit {
                return None;
            }
        }

        Some(config)
    }

    /// Get the delay for an operation (if any)
    pub fn get_delay(&self, op: &Operation) -> Option<Duration> {
        self.configs.get(op).and_then(|c| c.delay)
    }
}
