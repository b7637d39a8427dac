//! Structured logging setup for pyshim
//!
//! Logging goes through the `tracing` ecosystem and writes to stderr so that
//! machine-readable reports on stdout stay clean.
//!
//! # Example
//!
//! ```no_run
//! use pyshim::util::logging;
//!
//! logging::init_logging(logging::LoggingConfig::default());
//!
//! use tracing::info;
//! info!(function = "hello", "Packaging function");
//! ```

use crate::error::PackError;
use std::env;
use std::sync::Once;
use tracing::{info, Level};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

pub const LOG_LEVEL_ENV: &str = "PYSHIM_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "PYSHIM_LOG_JSON";
/// When truthy, ignorable failures are logged with full detail
pub const DEBUG_ENV: &str = "PYSHIM_DEBUG";

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., pyshim::installer) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Parses a log level from a string
///
/// Returns `Level::INFO` for unknown input.
///
/// ```
/// use pyshim::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

/// Whether `PYSHIM_LOG_JSON` asks for JSON output
pub fn json_from_env() -> bool {
    env::var(LOG_JSON_ENV)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

/// Whether the debug environment flag is set
pub fn debug_enabled() -> bool {
    env::var(DEBUG_ENV).map(|v| is_truthy(&v)).unwrap_or(false)
}

/// Initializes the logging system. Only the first call has an effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();

        // RUST_LOG, when set, replaces the level-derived directive
        if env::var("RUST_LOG").is_err() {
            let directive: Directive = format!("pyshim={}", config.level)
                .parse()
                .unwrap_or_else(|_| LevelFilter::INFO.into());
            filter = filter.add_directive(directive);
        }

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

/// Record an ignorable failure. Terse by default; with the debug flag set
/// the variant and its source chain are logged as well.
pub fn log_ignorable(error: &PackError) {
    if debug_enabled() {
        let mut chain = Vec::new();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        info!(detail = ?error, causes = ?chain, "Skipping: {}", error);
    } else {
        info!("Skipping: {}", error);
    }
}
