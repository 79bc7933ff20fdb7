//! fc-builders - build orchestration for Function Compute sources
//!
//! Given a function's runtime and source directory, this library picks the
//! ecosystem build strategy (npm, pip, Maven, Composer, .NET, or a plain copy)
//! and runs its stages into an artifact directory. An inline command or a
//! script file can replace strategy selection entirely.
//!
//! # Core Concepts
//!
//! - **Registry**: maps each runtime to an ordered list of (manifest pattern,
//!   strategy) candidates
//! - **Detection**: the first candidate whose manifest exists in the source
//!   directory wins; no match falls back to the default strategy
//! - **Strategy**: the ecosystem procedure, run stage by stage
//!
//! # Example Usage
//!
//! ```no_run
//! use fc_builders::{BuildOrchestrator, BuildRequest};
//!
//! # async fn example() -> Result<(), fc_builders::BuildError> {
//! let orchestrator = BuildOrchestrator::with_defaults();
//! let request = BuildRequest::new("svc", "hello", "./code", "nodejs14", ".fc/build/hello");
//!
//! let outcome = orchestrator.build(&request).await?;
//! println!("Built with {:?}", outcome.strategy());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`stack`]: runtime and strategy identifiers, the registry
//! - [`detection`]: manifest based strategy selection
//! - [`strategies`]: ecosystem build procedures
//! - [`exec`]: subprocess execution
//! - [`pipeline`]: the orchestrator tying it together

pub mod cli;
pub mod config;
pub mod detection;
pub mod exec;
pub mod pipeline;
pub mod progress;
pub mod stack;
pub mod strategies;
pub mod util;

pub use config::{BuilderConfig, ConfigError};
pub use detection::{DetectError, ManifestDetector, StrategyDetector};
pub use exec::{CommandExecutor, ExecError, ExecOutput, ShellExecutor};
pub use pipeline::{
    BuildError, BuildOrchestrator, BuildOutcome, BuildPayload, BuildRequest, FailurePhase,
};
pub use progress::{BuildEvent, LoggingHandler, NoOpHandler, ProgressHandler};
pub use stack::{RuntimeId, Stage, StrategyKind, StrategyRegistry};
pub use strategies::{Strategy, StrategyContext, StrategyError, StrategyFactory};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_fc_builders() {
        assert_eq!(NAME, "fc-builders");
    }
}
