//! Structured logging setup
//!
//! Logs go to stderr so reports printed on stdout stay machine-readable.
//! Configuration comes from the CLI flags or from the environment:
//!
//! - `COMPOSERIFY_LOG_LEVEL`: trace, debug, info, warn or error
//! - `COMPOSERIFY_LOG_JSON`: `true` for one JSON object per line
//! - `RUST_LOG`: standard filter directives, applied on top
//!
//! ```no_run
//! use composerify::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!(site = "/srv/site", "Starting conversion");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,

    /// One JSON object per event instead of human-readable lines.
    pub use_json: bool,

    pub include_target: bool,

    /// File and line of the emitting call.
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
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

    /// Debugging a conversion: every git call is visible, with its origin.
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: true,
        }
    }

    pub fn from_env() -> Self {
        let level = env::var("COMPOSERIFY_LOG_LEVEL")
            .ok()
            .and_then(|v| parse_level(&v))
            .unwrap_or(Level::INFO);

        let use_json = env::var("COMPOSERIFY_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }
}

/// Case-insensitive level name, `None` when unrecognised.
pub fn parse_level(level: &str) -> Option<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::builder()
            .with_default_directive(Level::WARN.into())
            .from_env_lossy();
        if let Ok(directive) = format!("composerify={}", config.level).parse() {
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
                        .with_line_number(config.include_location),
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
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}
