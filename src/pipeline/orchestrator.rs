use super::error::BuildError;
use super::request::{BuildOutcome, BuildPayload, BuildRequest};
use crate::detection::{ManifestDetector, StrategyDetector};
use crate::exec::{CommandExecutor, ExecError, ShellExecutor};
use crate::progress::{BuildEvent, ProgressHandler};
use crate::stack::{RuntimeId, StrategyRegistry};
use crate::strategies::{DefaultStrategyFactory, OptionMap, StrategyContext, StrategyFactory};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs builds: override commands directly, everything else through
/// detection and a strategy.
///
/// Holds no per-build state, so one orchestrator can serve concurrent builds.
pub struct BuildOrchestrator {
    detector: Arc<dyn StrategyDetector>,
    factory: Arc<dyn StrategyFactory>,
    executor: Arc<dyn CommandExecutor>,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl BuildOrchestrator {
    pub fn new(
        detector: Arc<dyn StrategyDetector>,
        factory: Arc<dyn StrategyFactory>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            detector,
            factory,
            executor,
            progress_handler: None,
        }
    }

    /// Manifest detection over `registry`, built-in strategies, and `executor`
    /// for both strategies and overrides.
    pub fn from_registry(
        registry: Arc<StrategyRegistry>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self::new(
            Arc::new(ManifestDetector::new(registry)),
            Arc::new(DefaultStrategyFactory::new(Arc::clone(&executor))),
            executor,
        )
    }

    pub fn with_defaults() -> Self {
        Self::from_registry(
            Arc::new(StrategyRegistry::with_defaults()),
            Arc::new(ShellExecutor::new()),
        )
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }

    /// Builds one function.
    ///
    /// The request is never modified, so a failed build can be retried with
    /// the same request.
    pub async fn build(&self, request: &BuildRequest) -> Result<BuildOutcome, BuildError> {
        let start = Instant::now();
        info!(
            service = %request.service_name,
            function = %request.function_name,
            runtime = %request.runtime,
            source_dir = %request.source_dir.display(),
            "Building function"
        );

        self.emit(BuildEvent::Started {
            function: request.function_name.clone(),
            runtime: request.runtime.clone(),
        });

        let result = match &request.payload {
            BuildPayload::Command(command) => self.run_command(request, command).await,
            BuildPayload::ScriptFile(script) => self.run_script(request, script).await,
            BuildPayload::StrategyOptions(options) => self.run_strategy(request, options).await,
        };

        match &result {
            Ok(_) => {
                info!(
                    function = %request.function_name,
                    total_time_ms = start.elapsed().as_millis(),
                    "Build finished"
                );
                self.emit(BuildEvent::Completed {
                    total_time: start.elapsed(),
                });
            }
            Err(e) => {
                debug!(function = %request.function_name, phase = ?e.phase(), "Build failed");
                self.emit(BuildEvent::Failed {
                    error: e.to_string(),
                });
            }
        }

        result
    }

    async fn run_command(
        &self,
        request: &BuildRequest,
        command: &str,
    ) -> Result<BuildOutcome, BuildError> {
        self.emit(BuildEvent::OverrideStarted {
            description: format!("command: {}", command),
        });
        prepare_artifact_dir(&request.artifact_dir).await?;

        let output = self
            .executor
            .exec(command, &request.artifact_dir, request.verbose)
            .await
            .map_err(|source| BuildError::CommandFailed { source })?;

        Ok(BuildOutcome::Command { output })
    }

    async fn run_script(
        &self,
        request: &BuildRequest,
        script: &Path,
    ) -> Result<BuildOutcome, BuildError> {
        self.emit(BuildEvent::OverrideStarted {
            description: format!("script: {}", script.display()),
        });
        prepare_artifact_dir(&request.artifact_dir).await?;

        let output = self
            .executor
            .exec_file(script, &request.artifact_dir, request.verbose)
            .await
            .map_err(|source| BuildError::CommandFailed { source })?;

        Ok(BuildOutcome::Script { output })
    }

    async fn run_strategy(
        &self,
        request: &BuildRequest,
        options: &OptionMap,
    ) -> Result<BuildOutcome, BuildError> {
        let detect_start = Instant::now();
        let strategy = self
            .detector
            .detect(&request.runtime, &request.source_dir)?;
        debug!(runtime = %request.runtime, strategy = %strategy, "Detected strategy");

        self.emit(BuildEvent::Detected {
            strategy,
            detection_time: detect_start.elapsed(),
        });

        let ctx = StrategyContext {
            service_name: request.service_name.clone(),
            function_name: request.function_name.clone(),
            source_dir: request.source_dir.clone(),
            artifact_dir: request.artifact_dir.clone(),
            stages: request.stages.clone(),
            options: with_runtime(options, &request.runtime),
            runtime: request.runtime.clone(),
            verbose: request.verbose,
        };

        let runner = self
            .factory
            .create(strategy, ctx)
            .ok_or_else(|| BuildError::NoTaskFlow {
                runtime: request.runtime.clone(),
                strategy,
            })?;

        self.emit(BuildEvent::StrategyStarted {
            strategy,
            stages: request.stages.len(),
        });

        let strategy_start = Instant::now();
        runner
            .start()
            .await
            .map_err(|source| BuildError::BuildFailed {
                function: request.function_name.clone(),
                runtime: request.runtime.clone(),
                source_dir: request.source_dir.clone(),
                strategy,
                source,
            })?;

        self.emit(BuildEvent::StrategyComplete {
            strategy,
            duration: strategy_start.elapsed(),
        });

        Ok(BuildOutcome::Strategy {
            strategy,
            stages: request.stages.clone(),
        })
    }
}

impl Default for BuildOrchestrator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

async fn prepare_artifact_dir(path: &Path) -> Result<(), BuildError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| BuildError::CommandFailed {
            source: ExecError::WorkingDir {
                path: path.to_path_buf(),
                source,
            },
        })
}

/// Copy of `options` carrying a `runtime` entry.
///
/// An existing `runtime` is kept unless it is missing or falsy (null, `false`,
/// zero, or an empty string), in which case the request runtime replaces it.
pub fn with_runtime(options: &OptionMap, runtime: &RuntimeId) -> OptionMap {
    let mut options = options.clone();
    let present = match options.get("runtime") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    };
    if !present {
        options.insert("runtime".to_string(), Value::from(runtime.as_str()));
    }
    options
}
