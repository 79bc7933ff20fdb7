//! Build strategies
//!
//! A strategy is the ecosystem specific procedure (npm, pip, Maven, Composer,
//! .NET, or the plain-copy default) that turns a source directory into build
//! artifacts. Every strategy honors the same contract: it is constructed from a
//! [`StrategyContext`] and driven through its stages by [`Strategy::start`].
//!
//! Most strategies are a [`TaskFlow`], a pure description of the steps each
//! stage needs, executed by [`StagedStrategy`].

use crate::exec::{CommandExecutor, CommandSpec, ExecError};
use crate::stack::{RuntimeId, Stage, StrategyKind};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub mod composer;
pub mod copy;
pub mod default;
pub mod dotnet;
pub mod maven;
pub mod npm;
pub mod pip;

pub use composer::ComposerTaskFlow;
pub use default::DefaultTaskFlow;
pub use dotnet::DotnetTaskFlow;
pub use maven::MavenTaskFlow;
pub use npm::NpmTaskFlow;
pub use pip::PipTaskFlow;

/// Ecosystem specific options passed through from the build request
pub type OptionMap = Map<String, Value>;

/// Failure of a single step inside a stage
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Invalid manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("{strategy} stage '{stage}' failed: {source}")]
    StageFailed {
        strategy: StrategyKind,
        stage: Stage,
        #[source]
        source: StepError,
    },

    #[error("{0}")]
    Failed(String),
}

impl StrategyError {
    /// Stage that was running when the strategy failed, if known
    pub fn stage(&self) -> Option<&Stage> {
        match self {
            StrategyError::StageFailed { stage, .. } => Some(stage),
            StrategyError::Failed(_) => None,
        }
    }
}

/// Everything a strategy is constructed with
#[derive(Debug, Clone)]
pub struct StrategyContext {
    pub service_name: String,
    pub function_name: String,
    pub source_dir: PathBuf,
    pub artifact_dir: PathBuf,
    pub stages: Vec<Stage>,
    /// Request options, always carrying a `runtime` entry
    pub options: OptionMap,
    pub runtime: RuntimeId,
    pub verbose: bool,
}

impl StrategyContext {
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Runtime as seen through the options map, falling back to the request runtime.
    pub fn effective_runtime(&self) -> &str {
        self.option_str("runtime").unwrap_or(self.runtime.as_str())
    }
}

#[async_trait]
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Runs the requested stages in order and returns once every spawned
    /// process has exited.
    async fn start(&self) -> Result<(), StrategyError>;
}

/// One unit of work inside a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Copy the source tree into the artifact directory
    CopySource,
    /// Copy files matching a pattern, relative to the source dir, into the artifact directory
    CollectArtifacts(String),
    Run(CommandSpec),
}

/// Declarative description of an ecosystem's stages
pub trait TaskFlow: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Steps for `stage`; an empty list means the stage is a no-op.
    fn steps(&self, stage: &Stage, ctx: &StrategyContext) -> Result<Vec<Step>, StepError>;
}

/// Runs a [`TaskFlow`] stage by stage, step by step.
pub struct StagedStrategy<F> {
    flow: F,
    ctx: StrategyContext,
    executor: Arc<dyn CommandExecutor>,
}

impl<F: TaskFlow> StagedStrategy<F> {
    pub fn new(flow: F, ctx: StrategyContext, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            flow,
            ctx,
            executor,
        }
    }

    fn failed(&self, stage: &Stage, source: StepError) -> StrategyError {
        StrategyError::StageFailed {
            strategy: self.flow.kind(),
            stage: stage.clone(),
            source,
        }
    }

    async fn run_step(&self, step: &Step) -> Result<(), StepError> {
        match step {
            Step::CopySource => {
                let from = self.ctx.source_dir.clone();
                let to = self.ctx.artifact_dir.clone();
                let copied = copy::copy_tree_blocking(from, to).await?;
                debug!(files = copied, "Copied source tree");
            }
            Step::CollectArtifacts(pattern) => {
                let copied =
                    copy::collect_matching(&self.ctx.source_dir, pattern, &self.ctx.artifact_dir)?;
                debug!(pattern = %pattern, files = copied, "Collected artifacts");
            }
            Step::Run(spec) => {
                self.executor.run(spec, self.ctx.verbose).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<F: TaskFlow> Strategy for StagedStrategy<F> {
    fn kind(&self) -> StrategyKind {
        self.flow.kind()
    }

    async fn start(&self) -> Result<(), StrategyError> {
        let strategy = self.flow.kind();

        for stage in &self.ctx.stages {
            let steps = self
                .flow
                .steps(stage, &self.ctx)
                .map_err(|e| self.failed(stage, e))?;

            if steps.is_empty() {
                debug!(strategy = %strategy, stage = %stage, "Stage is a no-op");
                continue;
            }

            info!(
                strategy = %strategy,
                stage = %stage,
                function = %self.ctx.function_name,
                steps = steps.len(),
                "Running stage"
            );

            for step in &steps {
                self.run_step(step).await.map_err(|e| self.failed(stage, e))?;
            }
        }

        Ok(())
    }
}

/// Constructs strategies by kind.
///
/// Returning `None` means the factory has no implementation for `kind`.
pub trait StrategyFactory: Send + Sync {
    fn create(&self, kind: StrategyKind, ctx: StrategyContext) -> Option<Box<dyn Strategy>>;
}

/// Factory for every built-in strategy, sharing one executor
#[derive(Clone)]
pub struct DefaultStrategyFactory {
    executor: Arc<dyn CommandExecutor>,
}

impl DefaultStrategyFactory {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }
}

impl StrategyFactory for DefaultStrategyFactory {
    fn create(&self, kind: StrategyKind, ctx: StrategyContext) -> Option<Box<dyn Strategy>> {
        let executor = Arc::clone(&self.executor);
        let strategy: Box<dyn Strategy> = match kind {
            StrategyKind::Npm => Box::new(StagedStrategy::new(NpmTaskFlow, ctx, executor)),
            StrategyKind::Pip => Box::new(StagedStrategy::new(PipTaskFlow, ctx, executor)),
            StrategyKind::Maven => Box::new(StagedStrategy::new(MavenTaskFlow, ctx, executor)),
            StrategyKind::Composer => {
                Box::new(StagedStrategy::new(ComposerTaskFlow, ctx, executor))
            }
            StrategyKind::Dotnet => Box::new(StagedStrategy::new(DotnetTaskFlow, ctx, executor)),
            StrategyKind::Default => {
                Box::new(StagedStrategy::new(DefaultTaskFlow, ctx, executor))
            }
        };
        Some(strategy)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{context, RecordingExecutor};
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stages_run_in_requested_order() {
        let source = TempDir::new().unwrap();
        let artifact = TempDir::new().unwrap();
        fs::write(source.path().join("composer.json"), "{}").unwrap();

        let executor = Arc::new(RecordingExecutor::default());
        let ctx = context(
            source.path(),
            artifact.path(),
            vec![Stage::Build, Stage::Install],
        );
        let strategy = StagedStrategy::new(DotnetTaskFlow, ctx, executor.clone());

        strategy.start().await.unwrap();

        let commands = executor.commands();
        assert!(commands[0].starts_with("dotnet publish"));
        assert_eq!(commands[1], "dotnet restore");
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_stages() {
        let source = TempDir::new().unwrap();
        let artifact = TempDir::new().unwrap();

        let executor = Arc::new(RecordingExecutor::failing("mvn"));
        let ctx = context(source.path(), artifact.path(), Stage::defaults());
        let strategy = StagedStrategy::new(MavenTaskFlow, ctx, executor.clone());

        let err = strategy.start().await.unwrap_err();
        assert_eq!(err.stage(), Some(&Stage::Install));
        assert!(matches!(
            err,
            StrategyError::StageFailed {
                strategy: StrategyKind::Maven,
                source: StepError::Exec(ExecError::NonZeroExit { .. }),
                ..
            }
        ));
        assert_eq!(executor.commands().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_stage_is_noop() {
        let source = TempDir::new().unwrap();
        let artifact = TempDir::new().unwrap();

        let executor = Arc::new(RecordingExecutor::default());
        let ctx = context(
            source.path(),
            artifact.path(),
            vec![Stage::Custom("lint".to_string())],
        );
        let strategy = StagedStrategy::new(NpmTaskFlow, ctx, executor.clone());

        strategy.start().await.unwrap();
        assert!(executor.commands().is_empty());
    }

    #[test]
    fn test_factory_supports_every_kind() {
        let factory = DefaultStrategyFactory::new(Arc::new(RecordingExecutor::default()));
        for kind in StrategyKind::ALL {
            let ctx = context(
                std::path::Path::new("/src"),
                std::path::Path::new("/out"),
                Stage::defaults(),
            );
            let strategy = factory.create(kind, ctx).unwrap();
            assert_eq!(strategy.kind(), kind);
        }
    }

    #[test]
    fn test_effective_runtime_prefers_options() {
        let mut ctx = context(
            std::path::Path::new("/src"),
            std::path::Path::new("/out"),
            vec![],
        );
        ctx.runtime = RuntimeId::from("dotnetcore2.1");
        assert_eq!(ctx.effective_runtime(), "custom");

        ctx.options.remove("runtime");
        assert_eq!(ctx.effective_runtime(), "dotnetcore2.1");
    }
}
