use crate::detection::DetectError;
use crate::exec::ExecError;
use crate::stack::{RuntimeId, Stage, StrategyKind};
use crate::strategies::StrategyError;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which half of a build failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePhase {
    Detection,
    Execution,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unknown runtime: {runtime}")]
    UnknownRuntime { runtime: RuntimeId },

    #[error("Source directory {path} is not readable: {source}")]
    SourceUnreadable { path: PathBuf, source: io::Error },

    #[error("Could not find a build strategy for runtime {runtime} (detected {strategy})")]
    NoTaskFlow {
        runtime: RuntimeId,
        strategy: StrategyKind,
    },

    #[error("Build of {function} ({runtime}, {source_dir}) failed: {source}")]
    BuildFailed {
        function: String,
        runtime: RuntimeId,
        source_dir: PathBuf,
        strategy: StrategyKind,
        source: StrategyError,
    },

    #[error("Build override failed: {source}")]
    CommandFailed { source: ExecError },
}

impl BuildError {
    pub fn phase(&self) -> FailurePhase {
        match self {
            BuildError::UnknownRuntime { .. }
            | BuildError::SourceUnreadable { .. }
            | BuildError::NoTaskFlow { .. } => FailurePhase::Detection,
            BuildError::BuildFailed { .. } | BuildError::CommandFailed { .. } => {
                FailurePhase::Execution
            }
        }
    }

    /// Stage that failed, when the failure happened inside a strategy stage
    pub fn stage(&self) -> Option<&Stage> {
        match self {
            BuildError::BuildFailed { source, .. } => source.stage(),
            _ => None,
        }
    }
}

impl From<DetectError> for BuildError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::UnknownRuntime(runtime) => BuildError::UnknownRuntime { runtime },
            DetectError::SourceUnreadable { path, source } => {
                BuildError::SourceUnreadable { path, source }
            }
        }
    }
}
