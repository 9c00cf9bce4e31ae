//! The staleness cache over the four scheduler resources
//!
//! Every read goes through the shared [`Retrier`], and every successful
//! fetch lands in exactly one [`ResourceCache`]. The background refresher
//! holds the same [`CacheShared`] and forces refreshes on its own schedule.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lava_protocol::{Device, DeviceSummary};
use tracing::info;

use crate::client::{ClientResult, Operation, RemoteClient};
use crate::refresh::{self, RefreshHandle, SweepReport};
use crate::retry::Retrier;

use super::entry::{CacheEntry, CachePolicy};
use super::resource::{ReadOutcome, RefreshMode, ResourceCache};

/// State shared between interactive readers and the refresher thread
pub(crate) struct CacheShared {
    client: Arc<dyn RemoteClient>,
    retrier: Retrier,
    policy: CachePolicy,
    device_list: ResourceCache<(), Vec<DeviceSummary>>,
    devices: ResourceCache<String, Device>,
    device_tags: ResourceCache<String, Vec<String>>,
    templates: ResourceCache<String, String>,
    sweeps: AtomicU64,
}

impl CacheShared {
    pub(crate) fn device_list(&self, mode: RefreshMode) -> ClientResult<Vec<DeviceSummary>> {
        self.device_list_read(mode).map(|(value, _)| value)
    }

    pub(crate) fn device_list_read(
        &self,
        mode: RefreshMode,
    ) -> ClientResult<(Vec<DeviceSummary>, ReadOutcome)> {
        self.device_list
            .get_with_outcome(&(), &self.policy, mode, || {
                self.retrier
                    .fetch(Operation::ListDevices, || self.client.list_devices())
            })
    }

    pub(crate) fn device(&self, hostname: &str, mode: RefreshMode) -> ClientResult<Device> {
        self.device_read(hostname, mode).map(|(value, _)| value)
    }

    pub(crate) fn device_read(
        &self,
        hostname: &str,
        mode: RefreshMode,
    ) -> ClientResult<(Device, ReadOutcome)> {
        self.devices
            .get_with_outcome(&hostname.to_string(), &self.policy, mode, || {
                self.retrier
                    .fetch(Operation::ShowDevice, || self.client.show_device(hostname))
            })
    }

    pub(crate) fn device_tags(
        &self,
        hostname: &str,
        mode: RefreshMode,
    ) -> ClientResult<Vec<String>> {
        self.device_tags_read(hostname, mode).map(|(value, _)| value)
    }

    pub(crate) fn device_tags_read(
        &self,
        hostname: &str,
        mode: RefreshMode,
    ) -> ClientResult<(Vec<String>, ReadOutcome)> {
        self.device_tags
            .get_with_outcome(&hostname.to_string(), &self.policy, mode, || {
                self.retrier.fetch(Operation::ListDeviceTags, || {
                    self.client.list_device_tags(hostname)
                })
            })
    }

    pub(crate) fn device_type_template(
        &self,
        device_type: &str,
        mode: RefreshMode,
    ) -> ClientResult<String> {
        self.templates
            .get(&device_type.to_string(), &self.policy, mode, || {
                self.retrier.fetch(Operation::DeviceTypeTemplate, || {
                    self.client.device_type_template(device_type)
                })
            })
    }

    /// Hostnames in the device list as currently cached, without fetching
    pub(crate) fn known_hostnames(&self) -> Vec<String> {
        self.device_list
            .peek(&())
            .map(|entry| entry.value.into_iter().map(|d| d.hostname).collect())
            .unwrap_or_default()
    }

    pub(crate) fn record_sweep(&self) {
        self.sweeps.fetch_add(1, Ordering::SeqCst);
    }
}

/// Read-through cache for scheduler resources with bounded staleness.
///
/// Reads refresh once an entry is older than the poll interval. A failed
/// refresh falls back to the held value until it is older than the invalid
/// timeout, after which the failure is returned.
pub struct StalenessCache {
    shared: Arc<CacheShared>,
    refresher: Mutex<Option<RefreshHandle>>,
}

impl StalenessCache {
    /// Create a cache with no background refresher
    pub fn new(client: Arc<dyn RemoteClient>, retrier: Retrier, policy: CachePolicy) -> Self {
        let shared = CacheShared {
            client,
            retrier,
            policy,
            device_list: ResourceCache::new("device_list"),
            devices: ResourceCache::new("device"),
            device_tags: ResourceCache::new("device_tags"),
            templates: ResourceCache::new("device_type_template"),
            sweeps: AtomicU64::new(0),
        };
        Self {
            shared: Arc::new(shared),
            refresher: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.shared.policy
    }

    pub fn retrier(&self) -> &Retrier {
        &self.shared.retrier
    }

    fn refresher(&self) -> MutexGuard<'_, Option<RefreshHandle>> {
        self.refresher.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the background refresher. Does nothing if one is already running.
    pub fn start_refresher(&self, interval: Duration) -> io::Result<()> {
        let mut slot = self.refresher();
        if slot.as_ref().is_some_and(RefreshHandle::is_running) {
            return Ok(());
        }
        *slot = Some(refresh::spawn(Arc::clone(&self.shared), interval)?);
        info!(
            event = "lava.refresh.started",
            interval_ms = interval.as_millis() as u64,
        );
        Ok(())
    }

    /// Stop the background refresher and wait for it to exit
    pub fn stop_refresher(&self) {
        let handle = self.refresher().take();
        if let Some(handle) = handle {
            handle.stop();
        }
    }

    pub fn refresher_running(&self) -> bool {
        self.refresher()
            .as_ref()
            .is_some_and(RefreshHandle::is_running)
    }

    /// Number of background sweeps completed so far
    pub fn sweeps_completed(&self) -> u64 {
        self.shared.sweeps.load(Ordering::SeqCst)
    }

    /// Run one refresh sweep on the calling thread
    pub fn refresh_all(&self) -> SweepReport {
        refresh::sweep(&self.shared, None)
    }

    pub fn device_list(&self) -> ClientResult<Vec<DeviceSummary>> {
        self.shared.device_list(RefreshMode::IfStale)
    }

    pub fn device(&self, hostname: &str) -> ClientResult<Device> {
        self.shared.device(hostname, RefreshMode::IfStale)
    }

    pub fn device_tags(&self, hostname: &str) -> ClientResult<Vec<String>> {
        self.shared.device_tags(hostname, RefreshMode::IfStale)
    }

    pub fn device_type_template(&self, device_type: &str) -> ClientResult<String> {
        self.shared
            .device_type_template(device_type, RefreshMode::IfStale)
    }

    /// Cached device list entry, if any, without refreshing
    pub fn peek_device_list(&self) -> Option<CacheEntry<Vec<DeviceSummary>>> {
        self.shared.device_list.peek(&())
    }

    /// Cached device detail entry, if any, without refreshing
    pub fn peek_device(&self, hostname: &str) -> Option<CacheEntry<Device>> {
        self.shared.devices.peek(&hostname.to_string())
    }

    /// Cached tag entry, if any, without refreshing
    pub fn peek_device_tags(&self, hostname: &str) -> Option<CacheEntry<Vec<String>>> {
        self.shared.device_tags.peek(&hostname.to_string())
    }

    /// Cached template entry, if any, without refreshing
    pub fn peek_device_type_template(&self, device_type: &str) -> Option<CacheEntry<String>> {
        self.shared.templates.peek(&device_type.to_string())
    }
}

impl Drop for StalenessCache {
    fn drop(&mut self) {
        self.stop_refresher();
    }
}

impl std::fmt::Debug for StalenessCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StalenessCache")
            .field("policy", &self.shared.policy)
            .field("retry", self.shared.retrier.policy())
            .field("cached_devices", &self.shared.devices.len())
            .field("refresher_running", &self.refresher_running())
            .finish()
    }
}
