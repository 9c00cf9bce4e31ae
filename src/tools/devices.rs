//! Device reads and device-selection predicates

use lava_protocol::{eq_ignore_case, Device, DeviceSummary};
use tracing::debug;

use crate::client::{ClientResult, Operation};

use super::LavaTools;

fn tag_matches(tags: &[String], tag: &str, ignore_case: bool) -> bool {
    tags.iter().any(|t| {
        if ignore_case {
            eq_ignore_case(t, tag)
        } else {
            t == tag
        }
    })
}

fn has_all_tags<S: AsRef<str>>(device_tags: &[String], required: &[S], ignore_case: bool) -> bool {
    required
        .iter()
        .all(|tag| tag_matches(device_tags, tag.as_ref(), ignore_case))
}

impl LavaTools {
    /// Device list, cached
    pub fn device_list_cached(&self) -> ClientResult<Vec<DeviceSummary>> {
        self.cache.device_list()
    }

    /// Devices from the cached list whose health is good
    pub fn device_list_healthy_cached(&self) -> ClientResult<Vec<DeviceSummary>> {
        Ok(self
            .cache
            .device_list()?
            .into_iter()
            .filter(DeviceSummary::is_healthy)
            .collect())
    }

    /// Device list, fetched with retry
    pub fn device_list_with_retry(&self) -> ClientResult<Vec<DeviceSummary>> {
        self.retrier
            .fetch(Operation::ListDevices, || self.client.list_devices())
    }

    /// Device detail, cached
    pub fn device_cached(&self, hostname: &str) -> ClientResult<Device> {
        self.cache.device(hostname)
    }

    /// Device detail, fetched with retry
    pub fn device_with_retry(&self, hostname: &str) -> ClientResult<Device> {
        self.retrier
            .fetch(Operation::ShowDevice, || self.client.show_device(hostname))
    }

    /// Device tags, cached
    pub fn device_tags_cached(&self, hostname: &str) -> ClientResult<Vec<String>> {
        self.cache.device_tags(hostname)
    }

    /// Device tags, fetched with retry
    pub fn device_tags_with_retry(&self, hostname: &str) -> ClientResult<Vec<String>> {
        self.retrier.fetch(Operation::ListDeviceTags, || {
            self.client.list_device_tags(hostname)
        })
    }

    /// True if `hostname` is in the cached device list with good health.
    ///
    /// A device missing from the list is not alive; that is not an error.
    pub fn device_is_alive_cached(&self, hostname: &str) -> ClientResult<bool> {
        Ok(self
            .cache
            .device_list()?
            .iter()
            .any(|d| d.hostname == hostname && d.is_healthy()))
    }

    /// True if the device's cached tags contain `tag`
    pub fn device_has_tag_cached(
        &self,
        hostname: &str,
        tag: &str,
        ignore_case: bool,
    ) -> ClientResult<bool> {
        let tags = self.cache.device_tags(hostname)?;
        Ok(tag_matches(&tags, tag, ignore_case))
    }

    /// True if the device's cached tags contain every one of `tags`.
    ///
    /// An empty `tags` is trivially satisfied.
    pub fn device_has_tags_cached<S: AsRef<str>>(
        &self,
        hostname: &str,
        tags: &[S],
        ignore_case: bool,
    ) -> ClientResult<bool> {
        if tags.is_empty() {
            return Ok(true);
        }
        let device_tags = self.cache.device_tags(hostname)?;
        Ok(has_all_tags(&device_tags, tags, ignore_case))
    }

    /// First device in the cached list that is healthy, of `device_type`
    /// (case-insensitive) and carries all of `tags` (case-sensitive).
    ///
    /// Devices are checked in list order. A failed tag lookup ends the scan
    /// with that error.
    pub fn device_of_type_is_alive_and_has_tags_cached<S: AsRef<str>>(
        &self,
        device_type: &str,
        tags: &[S],
    ) -> ClientResult<Option<DeviceSummary>> {
        for device in self.cache.device_list()? {
            if !device.is_healthy() || !device.is_type(device_type) {
                continue;
            }
            if self.device_has_tags_cached(&device.hostname, tags, false)? {
                debug!(
                    event = "lava.select.matched",
                    device_type,
                    hostname = %device.hostname,
                );
                return Ok(Some(device));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::mock::MockScheduler;
    use crate::tools::test_support::tools_over;

    fn strings(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tag_matching_case() {
        let tags = strings(&["wifi", "usb"]);
        assert!(tag_matches(&tags, "WIFI", true));
        assert!(!tag_matches(&tags, "WIFI", false));
        assert!(tag_matches(&tags, "usb", false));
        assert!(has_all_tags(&tags, &["usb", "wifi"], false));
        assert!(!has_all_tags(&tags, &["usb", "hdmi"], false));
        assert!(has_all_tags::<&str>(&tags, &[], false));
    }

    #[test]
    fn test_healthy_list_filters_case_insensitively() {
        let mock = MockScheduler::with_devices(&[
            ("a", "qemu", "Good", &[]),
            ("b", "qemu", "Bad", &[]),
            ("c", "qemu", "GOOD", &[]),
            ("d", "qemu", "Maintenance", &[]),
        ]);
        let tools = tools_over(&mock, 0);

        let healthy: Vec<String> = tools
            .device_list_healthy_cached()
            .unwrap()
            .into_iter()
            .map(|d| d.hostname)
            .collect();
        assert_eq!(healthy, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_device_is_alive() {
        let mock = MockScheduler::with_devices(&[
            ("a", "qemu", "good", &[]),
            ("b", "qemu", "Retired", &[]),
        ]);
        let tools = tools_over(&mock, 0);

        assert!(tools.device_is_alive_cached("a").unwrap());
        assert!(!tools.device_is_alive_cached("b").unwrap());
        assert!(!tools.device_is_alive_cached("ghost").unwrap());
        assert_eq!(mock.calls(Operation::ListDevices), 1);
    }

    #[test]
    fn test_device_has_tags_short_circuits_on_empty() {
        let mock = MockScheduler::with_devices(&[("a", "qemu", "good", &["wifi"])]);
        let tools = tools_over(&mock, 0);

        assert!(tools.device_has_tags_cached::<&str>("a", &[], false).unwrap());
        assert_eq!(mock.calls(Operation::ListDeviceTags), 0);

        assert!(tools.device_has_tags_cached("a", &["WiFi"], true).unwrap());
        assert!(!tools.device_has_tags_cached("a", &["wifi", "usb"], false).unwrap());
        assert_eq!(mock.calls(Operation::ListDeviceTags), 1);
    }

    #[test]
    fn test_with_retry_bypasses_cache() {
        let mock = MockScheduler::with_devices(&[("a", "qemu", "good", &["wifi"])]);
        let tools = tools_over(&mock, 0);

        tools.device_tags_cached("a").unwrap();
        tools.device_tags_cached("a").unwrap();
        tools.device_tags_with_retry("a").unwrap();
        tools.device_tags_with_retry("a").unwrap();
        assert_eq!(mock.calls_for(Operation::ListDeviceTags, "a"), 3);

        tools.device_list_with_retry().unwrap();
        tools.device_with_retry("a").unwrap();
        assert_eq!(mock.calls(Operation::ListDevices), 1);
        assert_eq!(mock.calls(Operation::ShowDevice), 1);
        assert!(tools.cache().peek_device("a").is_none());
    }

    #[test]
    fn test_device_detail_cached() {
        let mock = MockScheduler::with_devices(&[("a", "panda", "good", &["wifi"])]);
        let tools = tools_over(&mock, 0);

        let device = tools.device_cached("a").unwrap();
        assert_eq!(device.device_type, "panda");
        tools.device_cached("a").unwrap();
        assert_eq!(mock.calls(Operation::ShowDevice), 1);
    }

    #[test]
    fn test_selection_skips_unhealthy_and_wrong_type() {
        let mock = MockScheduler::with_devices(&[
            ("a", "panda", "bad", &["wifi"]),
            ("b", "beagle", "good", &["wifi"]),
            ("c", "PANDA", "good", &["wifi"]),
        ]);
        let tools = tools_over(&mock, 0);

        let found = tools
            .device_of_type_is_alive_and_has_tags_cached("panda", &["wifi"])
            .unwrap()
            .unwrap();
        assert_eq!(found.hostname, "c");
        // Only the candidate's tags were looked up
        assert_eq!(mock.calls(Operation::ListDeviceTags), 1);
    }

    #[test]
    fn test_selection_tag_error_aborts_scan() {
        let mock = MockScheduler::with_devices(&[
            ("a", "panda", "good", &["usb"]),
            ("b", "panda", "good", &["wifi"]),
        ]);
        mock.inject_error(
            Operation::ListDeviceTags,
            ClientError::Transport("connection reset".to_string()),
        );
        let tools = tools_over(&mock, 1);

        let err = tools
            .device_of_type_is_alive_and_has_tags_cached("panda", &["wifi"])
            .unwrap_err();
        assert_eq!(err, ClientError::Transport("connection reset".to_string()));
        // First candidate only, two attempts
        assert_eq!(mock.calls_for(Operation::ListDeviceTags, "a"), 2);
        assert_eq!(mock.calls_for(Operation::ListDeviceTags, "b"), 0);
    }
}
