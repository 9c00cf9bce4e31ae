//! Staleness Cache Integration Tests
//!
//! Exercises the poll/invalid windows through the public facade against the
//! mock scheduler:
//! - reads within the poll interval make no scheduler calls
//! - a failed refresh inside the invalid timeout serves the old value
//! - a failed refresh past the invalid timeout (or with nothing cached) fails

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use lava_tools::mock::{FailureConfig, MockScheduler};
use lava_tools::{CachePolicy, ClientError, LavaTools, Operation, RetryPolicy, ToolsOptions};

fn tools(mock: &MockScheduler, poll: Duration, invalid: Duration, retries: u32) -> LavaTools {
    LavaTools::new(
        Arc::new(mock.clone()),
        ToolsOptions {
            retry: RetryPolicy::new(retries, Duration::ZERO),
            cache: CachePolicy::new(poll, invalid),
            refresh_interval: None,
            ..Default::default()
        },
    )
    .unwrap()
}

fn board_farm() -> MockScheduler {
    let mock = MockScheduler::with_devices(&[
        ("panda-01", "panda", "Good", &["wifi"]),
        ("panda-02", "panda", "Good", &["wifi", "usb"]),
    ]);
    mock.set_template("panda", "{% extends 'panda.jinja2' %}");
    mock
}

// === Cache Hits ===

#[test]
fn test_second_read_within_poll_interval_is_free() {
    let mock = board_farm();
    let tools = tools(&mock, Duration::from_secs(60), Duration::from_secs(120), 0);

    tools.device_list_cached().unwrap();
    tools.device_cached("panda-01").unwrap();
    tools.device_tags_cached("panda-01").unwrap();
    tools.device_type_template_cached("panda").unwrap();
    mock.reset_calls();

    tools.device_list_cached().unwrap();
    tools.device_cached("panda-01").unwrap();
    tools.device_tags_cached("panda-01").unwrap();
    tools.device_type_template_cached("panda").unwrap();

    for op in [
        Operation::ListDevices,
        Operation::ShowDevice,
        Operation::ListDeviceTags,
        Operation::DeviceTypeTemplate,
    ] {
        assert_eq!(mock.calls(op), 0, "{} should be served from cache", op);
    }
}

#[test]
fn test_cache_hit_is_fast_even_when_scheduler_is_slow() {
    let mock = board_farm();
    mock.inject_failure(
        Operation::ListDevices,
        FailureConfig::delay(Duration::from_millis(100)),
    );
    let tools = tools(&mock, Duration::from_secs(60), Duration::from_secs(120), 0);

    let start = Instant::now();
    tools.device_list_cached().unwrap();
    assert!(start.elapsed() >= Duration::from_millis(100));

    let start = Instant::now();
    tools.device_list_cached().unwrap();
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[test]
fn test_stale_entry_is_refreshed() {
    let mock = board_farm();
    let tools = tools(&mock, Duration::from_millis(20), Duration::from_secs(60), 0);

    assert_eq!(tools.device_list_cached().unwrap().len(), 2);
    mock.add_device(
        lava_protocol::DeviceSummary::new("panda-03", "panda", "Good"),
        vec![],
    );
    // Still fresh: the new device is not visible yet
    assert_eq!(tools.device_list_cached().unwrap().len(), 2);

    thread::sleep(Duration::from_millis(40));
    assert_eq!(tools.device_list_cached().unwrap().len(), 3);
    assert_eq!(mock.calls(Operation::ListDevices), 2);
}

// === Stale-Tolerated Reads ===

#[test]
fn test_failed_refresh_within_invalid_timeout_serves_old_value() {
    let mock = board_farm();
    let tools = tools(&mock, Duration::from_millis(10), Duration::from_secs(60), 2);

    let before = tools.device_tags_cached("panda-02").unwrap();
    thread::sleep(Duration::from_millis(30));

    mock.set_tags("panda-02", &["hdmi"]);
    mock.inject_error(
        Operation::ListDeviceTags,
        ClientError::Transport("connection refused".to_string()),
    );

    let after = tools.device_tags_cached("panda-02").unwrap();
    assert_eq!(after, before);
    // One initial fetch plus three attempts for the failed refresh
    assert_eq!(mock.calls_for(Operation::ListDeviceTags, "panda-02"), 4);
}

#[test]
fn test_recovered_scheduler_replaces_stale_value() {
    let mock = board_farm();
    let tools = tools(&mock, Duration::from_millis(10), Duration::from_secs(60), 0);

    tools.device_tags_cached("panda-01").unwrap();
    thread::sleep(Duration::from_millis(30));
    mock.inject_error(
        Operation::ListDeviceTags,
        ClientError::Transport("connection refused".to_string()),
    );
    assert_eq!(
        tools.device_tags_cached("panda-01").unwrap(),
        vec!["wifi".to_string()]
    );

    mock.clear_failures();
    mock.set_tags("panda-01", &["wifi", "audio"]);
    assert_eq!(
        tools.device_tags_cached("panda-01").unwrap(),
        vec!["wifi".to_string(), "audio".to_string()]
    );
}

// === Hard Failures ===

#[test]
fn test_failure_with_nothing_cached_is_an_error() {
    let mock = board_farm();
    mock.inject_error(
        Operation::ListDevices,
        ClientError::Transport("no route to host".to_string()),
    );
    let tools = tools(&mock, Duration::from_secs(60), Duration::from_secs(120), 1);

    let err = tools.device_list_cached().unwrap_err();
    assert_eq!(err, ClientError::Transport("no route to host".to_string()));
    assert!(tools.cache().peek_device_list().is_none());
}

#[test]
fn test_failure_past_invalid_timeout_is_an_error() {
    let mock = board_farm();
    let tools = tools(&mock, Duration::from_millis(10), Duration::from_millis(30), 0);

    tools.device_type_template_cached("panda").unwrap();
    thread::sleep(Duration::from_millis(60));
    mock.inject_error(
        Operation::DeviceTypeTemplate,
        ClientError::Timeout(Duration::from_secs(30)),
    );

    let err = tools.device_type_template_cached("panda").unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));

    // Once the scheduler answers again the entry is usable
    mock.clear_failures();
    assert!(tools.device_type_template_cached("panda").is_ok());
}

#[test]
fn test_empty_tag_list_is_cached() {
    let mock = MockScheduler::with_devices(&[("qemu-01", "qemu", "Good", &[])]);
    let tools = tools(&mock, Duration::from_secs(60), Duration::from_secs(120), 0);

    assert!(tools.device_tags_cached("qemu-01").unwrap().is_empty());
    assert!(tools.device_tags_cached("qemu-01").unwrap().is_empty());
    assert_eq!(mock.calls(Operation::ListDeviceTags), 1);
    assert!(tools.cache().peek_device_tags("qemu-01").is_some());
}
