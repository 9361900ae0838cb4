//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem for structured logging with support for
//! both human-readable and JSON output formats.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `verbose` - If true, enables DEBUG level logging; otherwise INFO level.
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
///
/// Log output goes to stderr (stdout carries analysis output) and `RUST_LOG`
/// overrides the level.
pub fn init(verbose: bool, json_format: bool) {
    // Build the filter, respecting RUST_LOG if set
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_format {
        // JSON format for machine parsing
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        // Pretty format for humans
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section, with CLI overrides.
///
/// `--verbose` and `--json-logs` only ever turn options on; they never
/// downgrade what the config file asks for.
pub fn init_from_config(
    config: &market_vision_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let (verbose, json_format) = resolve(&config.logging, verbose_override, json_logs_override);
    init(verbose, json_format);
}

fn resolve(
    logging: &market_vision_core::config::LoggingConfig,
    verbose_override: bool,
    json_logs_override: bool,
) -> (bool, bool) {
    let verbose = verbose_override || matches!(logging.level.as_str(), "debug" | "trace");
    let json_format = json_logs_override || logging.format == "json";
    (verbose, json_format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_vision_core::config::LoggingConfig;

    #[test]
    fn test_defaults_are_info_pretty() {
        assert_eq!(resolve(&LoggingConfig::default(), false, false), (false, false));
    }

    #[test]
    fn test_config_debug_and_json() {
        let logging = LoggingConfig {
            level: "trace".to_string(),
            format: "json".to_string(),
        };
        assert_eq!(resolve(&logging, false, false), (true, true));
    }

    #[test]
    fn test_cli_flags_override_config() {
        assert_eq!(resolve(&LoggingConfig::default(), true, true), (true, true));
    }
}
