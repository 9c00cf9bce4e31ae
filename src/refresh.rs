//! Background refresher
//!
//! A single thread that sleeps for the configured interval, then forces a
//! refresh of the device list followed by the detail and tags of every
//! device in it. Failures are logged and left for interactive reads to
//! surface through the normal staleness rules.
//!
//! The thread exits when its [`RefreshHandle`] is stopped or dropped.

use std::io;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cache::{CacheShared, ReadOutcome, RefreshMode};
use crate::client::ClientResult;

/// Default time between sweeps (5 minutes)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Counts from a single sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Devices walked (taken from the cached list after its refresh)
    pub devices: usize,
    /// Whether the device list refresh failed
    pub device_list_failed: bool,
    /// Failed per-device refreshes (detail and tags counted separately)
    pub failures: usize,
    /// Sweep cut short by a stop request
    pub interrupted: bool,
}

/// Wakes the refresher early when it is asked to stop
#[derive(Debug, Default)]
pub(crate) struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn stop(&self) {
        let mut stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        self.wake.notify_all();
    }

    pub(crate) fn is_stopped(&self) -> bool {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep up to `timeout`. Returns true if a stop was requested.
    fn wait(&self, timeout: Duration) -> bool {
        let stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = self
            .wake
            .wait_timeout_while(stopped, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }
}

/// Owner of a running refresher thread
#[derive(Debug)]
pub struct RefreshHandle {
    signal: Arc<StopSignal>,
    thread: Option<JoinHandle<()>>,
    interval: Duration,
}

impl RefreshHandle {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Ask the thread to exit and wait for it.
    ///
    /// A sweep in progress stops at the next device boundary; a retried
    /// fetch already under way runs to completion first.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.signal.stop();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!(event = "lava.refresh.panicked");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawn the refresher thread over `shared`
pub(crate) fn spawn(shared: Arc<CacheShared>, interval: Duration) -> io::Result<RefreshHandle> {
    if interval.is_zero() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "refresh interval must be greater than zero",
        ));
    }

    let signal = Arc::new(StopSignal::default());
    let thread_signal = Arc::clone(&signal);
    let thread = thread::Builder::new()
        .name("lava-refresh".to_string())
        .spawn(move || run(&shared, &thread_signal, interval))?;

    Ok(RefreshHandle {
        signal,
        thread: Some(thread),
        interval,
    })
}

fn run(shared: &CacheShared, signal: &StopSignal, interval: Duration) {
    while !signal.wait(interval) {
        let started = Instant::now();
        let report = sweep(shared, Some(signal));
        shared.record_sweep();
        debug!(
            event = "lava.refresh.sweep",
            devices = report.devices,
            failures = report.failures,
            device_list_failed = report.device_list_failed,
            interrupted = report.interrupted,
            duration_ms = started.elapsed().as_millis() as u64,
        );
    }
    info!(event = "lava.refresh.stopped");
}

/// Force-refresh the device list, then every device in it.
///
/// Per-device refreshes use whatever list is cached once the list refresh
/// is done, so a failed list refresh still walks the previous list.
pub(crate) fn sweep(shared: &CacheShared, signal: Option<&StopSignal>) -> SweepReport {
    let mut report = SweepReport::default();

    if let Some(reason) = refresh_failure(shared.device_list_read(RefreshMode::Force)) {
        report.device_list_failed = true;
        warn!(
            event = "lava.refresh.device_list_failed",
            error = %reason,
        );
    }

    for hostname in shared.known_hostnames() {
        if signal.is_some_and(StopSignal::is_stopped) {
            report.interrupted = true;
            break;
        }

        if let Some(reason) = refresh_failure(shared.device_read(&hostname, RefreshMode::Force)) {
            report.failures += 1;
            debug!(
                event = "lava.refresh.device_failed",
                hostname = %hostname,
                error = %reason,
            );
        }
        if let Some(reason) =
            refresh_failure(shared.device_tags_read(&hostname, RefreshMode::Force))
        {
            report.failures += 1;
            debug!(
                event = "lava.refresh.tags_failed",
                hostname = %hostname,
                error = %reason,
            );
        }
        report.devices += 1;
    }

    report
}

/// Why a forced refresh did not store a new value, if it did not.
///
/// A tolerated stale read is still a failed refresh here, even though
/// readers get the held value back.
fn refresh_failure<V>(result: ClientResult<(V, ReadOutcome)>) -> Option<String> {
    match result {
        Ok((_, ReadOutcome::StaleTolerated)) => {
            Some("fetch failed, previous value kept".to_string())
        }
        Ok(_) => None,
        Err(e) => Some(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_signal_wakes_waiter() {
        let signal = Arc::new(StopSignal::default());
        let waiter = Arc::clone(&signal);

        let start = Instant::now();
        let thread = thread::spawn(move || waiter.wait(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(20));
        signal.stop();

        assert!(thread.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(signal.is_stopped());
    }

    #[test]
    fn test_wait_times_out_without_stop() {
        let signal = StopSignal::default();
        assert!(!signal.wait(Duration::from_millis(10)));
        assert!(!signal.is_stopped());
    }
}
