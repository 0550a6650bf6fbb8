//! Logging utilities for the Play catalog services.
//!
//! This module provides a standardized approach to logging across all crates
//! in the workspace. It includes functions for initializing the tracing
//! subscriber and small helpers for logging errors and results.

use play_config::LoggingConfig;
use std::str::FromStr;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crate targets that receive the configured level in addition to `RUST_LOG`.
const CRATE_TARGETS: [&str; 3] = ["play_db", "play_config", "play_common"];

/// Initialize the tracing subscriber at INFO level.
///
/// # Examples
///
/// ```
/// use play_common::logging;
///
/// // Initialize with default log level (INFO)
/// logging::init();
///
/// // Calling again is harmless
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` directives are honoured; the given level is added for the
/// workspace crates. If a global subscriber is already installed this is a
/// no-op.
///
/// # Arguments
///
/// * `level` - The minimum log level to display for the workspace crates.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    for target in CRATE_TARGETS {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    // try_init: a subscriber may already be set (tests, embedding applications)
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize the tracing subscriber from the `logging` configuration section.
///
/// Unknown level names fall back to INFO.
pub fn init_from_config(config: &LoggingConfig) {
    let level = parse_level(&config.level);
    init_with_level(level.unwrap_or(Level::INFO));

    // reported once a subscriber exists to receive it
    if level.is_none() {
        warn!("Unknown log level '{}', using INFO", config.level);
    }
}

/// Parse a level name such as `"debug"` or `"WARN"`.
pub fn parse_level(name: &str) -> Option<Level> {
    Level::from_str(name.trim()).ok()
}

/// Log a result, with different messages for success and error cases.
///
/// Logs `success_message` at INFO if the result is Ok, or the error at ERROR
/// prefixed with `error_context`.
///
/// # Returns
///
/// The original result, allowing this function to be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_accepts_any_case() {
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level("WARN"), Some(Level::WARN));
        assert_eq!(parse_level(" info "), Some(Level::INFO));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_from_config(&LoggingConfig::default());
        init_from_config(&LoggingConfig {
            level: "nonsense".to_string(),
        });
    }

    #[test]
    fn test_unknown_level_warning_reaches_a_subscriber() {
        init_from_config(&LoggingConfig {
            level: "loud".to_string(),
        });

        assert!(tracing::dispatcher::has_been_set());
        assert!(tracing::enabled!(Level::WARN));
    }

    #[test]
    fn test_log_result_returns_input() {
        let ok: Result<u8, String> = log_result(Ok(3), "done", "failed");
        assert_eq!(ok, Ok(3));

        let err: Result<u8, String> = log_result(Err("boom".to_string()), "done", "failed");
        assert_eq!(err, Err("boom".to_string()));
    }
}
