use crate::exec::ExecOutput;
use crate::stack::{RuntimeId, Stage, StrategyKind};
use crate::strategies::OptionMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// What a build does besides the usual parameters.
///
/// `Command` and `ScriptFile` bypass strategy detection entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPayload {
    /// Inline shell command run in the artifact directory
    Command(String),
    /// Script file run in the artifact directory
    ScriptFile(PathBuf),
    /// Ecosystem specific options handed to the detected strategy
    StrategyOptions(OptionMap),
}

impl Default for BuildPayload {
    fn default() -> Self {
        BuildPayload::StrategyOptions(OptionMap::new())
    }
}

impl BuildPayload {
    /// Interprets a loose option bag: a non-blank `command` wins over a
    /// non-blank `scriptFile`, anything else is passed to the strategy.
    pub fn from_options(options: OptionMap) -> Self {
        let non_empty = |key: &str| {
            options
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };

        if let Some(command) = non_empty("command") {
            return BuildPayload::Command(command);
        }
        if let Some(script) = non_empty("scriptFile").or_else(|| non_empty("script_file")) {
            return BuildPayload::ScriptFile(PathBuf::from(script));
        }
        BuildPayload::StrategyOptions(options)
    }
}

/// Parameters for one build
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub service_name: String,
    pub function_name: String,
    pub source_dir: PathBuf,
    pub runtime: RuntimeId,
    pub artifact_dir: PathBuf,
    /// Stream subprocess output at `info` instead of `debug`
    pub verbose: bool,
    pub stages: Vec<Stage>,
    pub payload: BuildPayload,
}

impl BuildRequest {
    pub fn new(
        service_name: impl Into<String>,
        function_name: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        runtime: impl Into<RuntimeId>,
        artifact_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            function_name: function_name.into(),
            source_dir: source_dir.into(),
            runtime: runtime.into(),
            artifact_dir: artifact_dir.into(),
            verbose: false,
            stages: Stage::defaults(),
            payload: BuildPayload::default(),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_stages(mut self, stages: Vec<Stage>) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_payload(mut self, payload: BuildPayload) -> Self {
        self.payload = payload;
        self
    }
}

/// Successful result of a build
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BuildOutcome {
    Command { output: ExecOutput },
    Script { output: ExecOutput },
    Strategy {
        strategy: StrategyKind,
        stages: Vec<Stage>,
    },
}

impl BuildOutcome {
    pub fn strategy(&self) -> Option<StrategyKind> {
        match self {
            BuildOutcome::Strategy { strategy, .. } => Some(*strategy),
            _ => None,
        }
    }
}
