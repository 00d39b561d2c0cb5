//! Logging initialization.
//!
//! Uses `tracing` with a `tracing-subscriber` registry. Logs go to stderr so
//! stdout stays free for command output (including `--json` reports).
//! `RUST_LOG` overrides the configured level when set.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the global subscriber.
///
/// `level` is the default filter directive used when `RUST_LOG` is unset.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Initialize from the `[logging]` config section plus CLI overrides.
///
/// `verbose` forces debug level; `json_logs` forces JSON output.
pub fn init_from_config(config: &LoggingConfig, verbose: bool, json_logs: bool) {
    let (level, json) = effective_settings(config, verbose, json_logs);
    init(level, json);
}

fn effective_settings(config: &LoggingConfig, verbose: bool, json_logs: bool) -> (&str, bool) {
    let level = if verbose && !matches!(config.level.as_str(), "trace" | "debug") {
        "debug"
    } else {
        config.level.as_str()
    };
    (level, json_logs || config.format == LogFormat::Json)
}
