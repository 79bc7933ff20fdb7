//! Configuration for fc-builders
//!
//! Settings come from environment variables with defaults. Command line flags
//! override them in the binary.
//!
//! # Environment Variables
//!
//! - `FC_BUILDERS_LOG_LEVEL`: Logging level - default: "info"
//! - `FC_BUILDERS_LOG_JSON`: JSON log output (true|false) - default: "false"
//! - `FC_BUILDERS_SHELL`: Shell for inline commands and scripts - default: platform shell
//! - `FC_BUILDERS_REGISTRY`: Path to a TOML file with extra runtime registrations
//! - `FC_BUILDERS_STAGES`: Comma separated stage list - default: "install,build"
//!
//! # Example
//!
//! ```no_run
//! use fc_builders::BuilderConfig;
//!
//! let config = BuilderConfig::default();
//! config.validate().expect("Invalid configuration");
//! let registry = config.load_registry().expect("Invalid registry overlay");
//! assert!(registry.len() > 0);
//! ```

use crate::exec::ShellExecutor;
use crate::stack::{RegistryError, Stage, StrategyRegistry};
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_STAGES: &str = "install,build";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    pub log_json: bool,

    /// Shell override for the command and script paths
    pub shell: Option<String>,

    /// Extra registrations merged over the built-in runtime table
    pub registry_overlay: Option<PathBuf>,

    /// Stages run when a build request names none
    pub stages: Vec<Stage>,
}

impl Default for BuilderConfig {
    /// Loads from `FC_BUILDERS_*` environment variables, falling back to defaults.
    fn default() -> Self {
        let log_level = env::var("FC_BUILDERS_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("FC_BUILDERS_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let shell = env::var("FC_BUILDERS_SHELL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let registry_overlay = env::var("FC_BUILDERS_REGISTRY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let stages = Stage::parse_list(
            &env::var("FC_BUILDERS_STAGES").unwrap_or_else(|_| DEFAULT_STAGES.to_string()),
        );

        Self {
            log_level,
            log_json,
            shell,
            registry_overlay,
            stages,
        }
    }
}

impl BuilderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.stages.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Stage list cannot be empty".to_string(),
            ));
        }

        if let Some(shell) = &self.shell {
            if shell.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "Shell cannot be blank".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Built-in runtime table merged with the configured overlay file, if any.
    pub fn load_registry(&self) -> Result<StrategyRegistry, ConfigError> {
        let mut registry = StrategyRegistry::with_defaults();
        if let Some(path) = &self.registry_overlay {
            registry.merge_file(path)?;
        }
        Ok(registry)
    }

    pub fn executor(&self) -> ShellExecutor {
        match &self.shell {
            Some(shell) => ShellExecutor::with_shell(shell.clone()),
            None => ShellExecutor::new(),
        }
    }
}

impl fmt::Display for BuilderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fc-builders Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  JSON Logs: {}", self.log_json)?;
        writeln!(
            f,
            "  Shell: {}",
            self.shell.as_deref().unwrap_or("(platform default)")
        )?;
        if let Some(path) = &self.registry_overlay {
            writeln!(f, "  Registry Overlay: {}", path.display())?;
        }
        let stages: Vec<&str> = self.stages.iter().map(Stage::name).collect();
        writeln!(f, "  Stages: {}", stages.join(","))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::{RuntimeId, StrategyKind};
    use serial_test::serial;
    use std::io::Write;

    /// Temporarily sets or clears an environment variable for a test
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn clear_all() -> Vec<EnvGuard> {
        vec![
            EnvGuard::unset("FC_BUILDERS_LOG_LEVEL"),
            EnvGuard::unset("FC_BUILDERS_LOG_JSON"),
            EnvGuard::unset("FC_BUILDERS_SHELL"),
            EnvGuard::unset("FC_BUILDERS_REGISTRY"),
            EnvGuard::unset("FC_BUILDERS_STAGES"),
        ]
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = clear_all();

        let config = BuilderConfig::default();

        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(!config.log_json);
        assert!(config.shell.is_none());
        assert!(config.registry_overlay.is_none());
        assert_eq!(config.stages, Stage::defaults());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _cleared = clear_all();
        let _guards = vec![
            EnvGuard::set("FC_BUILDERS_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("FC_BUILDERS_LOG_JSON", "true"),
            EnvGuard::set("FC_BUILDERS_SHELL", "/bin/bash"),
            EnvGuard::set("FC_BUILDERS_REGISTRY", "/etc/fc/registry.toml"),
            EnvGuard::set("FC_BUILDERS_STAGES", "build"),
        ];

        let config = BuilderConfig::default();

        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
        assert_eq!(config.shell.as_deref(), Some("/bin/bash"));
        assert_eq!(
            config.registry_overlay,
            Some(PathBuf::from("/etc/fc/registry.toml"))
        );
        assert_eq!(config.stages, vec![Stage::Build]);
    }

    #[test]
    #[serial]
    fn test_validation_invalid_log_level() {
        let _guards = clear_all();
        let mut config = BuilderConfig::default();
        config.log_level = "verbose".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    #[serial]
    fn test_validation_empty_stages() {
        let _guards = clear_all();
        let _stages = EnvGuard::set("FC_BUILDERS_STAGES", " , ");

        let config = BuilderConfig::default();
        assert!(config.stages.is_empty());
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_load_registry_with_overlay() {
        let _guards = clear_all();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[runtime]]\nname = \"nodejs16\"\nstrategies = [\"npm\"]").unwrap();

        let mut config = BuilderConfig::default();
        config.registry_overlay = Some(file.path().to_path_buf());

        let registry = config.load_registry().unwrap();
        let candidates = registry.lookup(&RuntimeId::from("nodejs16")).unwrap();
        assert_eq!(candidates[0].kind, StrategyKind::Npm);
        assert!(registry.contains(&RuntimeId::from("java8")));
    }

    #[test]
    #[serial]
    fn test_load_registry_missing_overlay() {
        let _guards = clear_all();
        let mut config = BuilderConfig::default();
        config.registry_overlay = Some(PathBuf::from("/nonexistent/registry.toml"));

        assert!(matches!(
            config.load_registry(),
            Err(ConfigError::Registry(RegistryError::Read { .. }))
        ));
    }

    #[test]
    #[serial]
    fn test_config_display() {
        let _guards = clear_all();
        let config = BuilderConfig::default();
        let display = format!("{}", config);
        assert!(display.contains("fc-builders Configuration:"));
        assert!(display.contains("Stages: install,build"));
    }
}
