//! Structured logging setup for fc-builders
//!
//! Configures a `tracing-subscriber` registry with an `EnvFilter` and either a
//! pretty or a JSON formatting layer. Logs go to stderr so that stdout stays
//! free for build reports.
//!
//! Filtering: `RUST_LOG` wins when set; otherwise only `fc_builders` logs, at the
//! configured level. Subprocess output streamed by the executor is logged under
//! the same target, so `debug` shows it for every build and `info` only for
//! verbose builds.
//!
//! # Example
//!
//! ```no_run
//! use fc_builders::util::logging;
//! use tracing::{debug, info};
//!
//! logging::init_from_env();
//!
//! info!("Application started");
//! debug!(runtime = "nodejs14", "Detecting strategy");
//! ```

use crate::config::BuilderConfig;
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., fc_builders::exec) in logs
    pub include_target: bool,

    /// Include file and line number information
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

    /// JSON output with targets and source locations, for log collectors.
    pub fn json(level: Level) -> Self {
        Self {
            level,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }

    pub fn from_builder_config(config: &BuilderConfig) -> Self {
        let level = parse_level(&config.log_level);
        if config.log_json {
            Self::json(level)
        } else {
            Self::with_level(level)
        }
    }
}

/// Parses a log level, case-insensitively, defaulting to `INFO`.
///
/// ```
/// use fc_builders::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
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

/// Filter directive enabling `level` for this crate only
pub fn crate_directive(level: Level) -> String {
    format!("fc_builders={}", level.as_str().to_lowercase())
}

/// Installs the global subscriber. Calls after the first are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = match env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) => EnvFilter::new(crate_directive(config.level)),
        };

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `FC_BUILDERS_LOG_LEVEL` and `FC_BUILDERS_LOG_JSON`.
pub fn init_from_env() {
    init_logging(LoggingConfig::from_builder_config(&BuilderConfig::default()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::Stage;

    fn builder_config(level: &str, json: bool) -> BuilderConfig {
        BuilderConfig {
            log_level: level.to_string(),
            log_json: json,
            shell: None,
            registry_overlay: None,
            stages: Stage::defaults(),
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("info"), Level::INFO);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_case_insensitive() {
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
    }

    #[test]
    fn test_parse_level_invalid() {
        assert_eq!(parse_level("invalid"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(!config.include_location);
    }

    #[test]
    fn test_from_builder_config() {
        let pretty = LoggingConfig::from_builder_config(&builder_config("warn", false));
        assert_eq!(pretty.level, Level::WARN);
        assert!(!pretty.use_json);

        let json = LoggingConfig::from_builder_config(&builder_config("debug", true));
        assert_eq!(json.level, Level::DEBUG);
        assert!(json.use_json);
        assert!(json.include_target);
    }

    #[test]
    fn test_crate_directive() {
        assert_eq!(crate_directive(Level::DEBUG), "fc_builders=debug");
        assert_eq!(crate_directive(Level::WARN), "fc_builders=warn");
    }

    #[test]
    fn test_crate_directive_parses_as_filter() {
        for level in [Level::TRACE, Level::INFO, Level::ERROR] {
            assert!(EnvFilter::try_new(crate_directive(level)).is_ok());
        }
    }
}
