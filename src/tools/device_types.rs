//! Device-type template reads

use crate::client::{ClientResult, Operation};

use super::LavaTools;

impl LavaTools {
    /// Device-type template, cached
    pub fn device_type_template_cached(&self, device_type: &str) -> ClientResult<String> {
        self.cache.device_type_template(device_type)
    }

    /// Device-type template, fetched with retry
    pub fn device_type_template_with_retry(&self, device_type: &str) -> ClientResult<String> {
        self.retrier.fetch(Operation::DeviceTypeTemplate, || {
            self.client.device_type_template(device_type)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::client::Operation;
    use crate::mock::{FailureConfig, MockScheduler};
    use crate::tools::test_support::tools_over;

    #[test]
    fn test_template_cached_and_retried() {
        let mock = MockScheduler::new();
        mock.set_template("x86", "{% extends 'x86.jinja2' %}");
        let tools = tools_over(&mock, 2);

        assert_eq!(
            tools.device_type_template_cached("x86").unwrap(),
            "{% extends 'x86.jinja2' %}"
        );
        tools.device_type_template_cached("x86").unwrap();
        assert_eq!(mock.calls(Operation::DeviceTypeTemplate), 1);

        mock.inject_failure(
            Operation::DeviceTypeTemplate,
            FailureConfig::transport("timed out").with_fail_count(2),
        );
        tools.device_type_template_with_retry("x86").unwrap();
        assert_eq!(mock.calls(Operation::DeviceTypeTemplate), 4);
    }

    #[test]
    fn test_unknown_type_is_not_found() {
        let tools = tools_over(&MockScheduler::new(), 0);
        assert!(tools
            .device_type_template_cached("nope")
            .unwrap_err()
            .is_not_found());
    }
}
