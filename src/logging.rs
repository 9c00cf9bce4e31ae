//! Tracing subscriber setup for binaries and tests built on this crate

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter directives
pub const LOG_ENV_VAR: &str = "LAVA_TOOLS_LOG";

/// Filter used when `LAVA_TOOLS_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the log layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Install the global subscriber, writing to stderr.
///
/// Returns false if a subscriber was already installed, in which case the
/// existing one is left in place.
pub fn init_logging(format: LogFormat) -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (plain, json) = match format {
        LogFormat::Plain => (
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        let _ = init_logging(LogFormat::Json);
        assert!(!init_logging(LogFormat::Plain));
        tracing::info!(event = "lava.logging.test", "still logging");
    }
}
