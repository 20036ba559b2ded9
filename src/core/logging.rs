//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::core::config::LogFormat;

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays pipeable.
pub fn init(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_ansi(true)
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .pretty()
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_ansi(false)
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .flatten_event(true)
            .try_init(),
    };

    if let Err(e) = result {
        tracing::warn!(error=%e, "tracing subscriber already installed");
    }
}
