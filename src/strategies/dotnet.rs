//! .NET strategy
//!
//! The target framework comes from the runtime (`dotnetcore2.1` publishes
//! `netcoreapp2.1`), which is why the orchestrator injects `runtime` into
//! the options.

use super::{Step, StepError, StrategyContext, TaskFlow};
use crate::exec::CommandSpec;
use crate::stack::{Stage, StrategyKind};

pub struct DotnetTaskFlow;

/// Maps `dotnetcoreX.Y` to the `netcoreappX.Y` target framework moniker.
pub fn target_framework(runtime: &str) -> Option<String> {
    let version = runtime.strip_prefix("dotnetcore")?;
    let valid = !version.is_empty()
        && version.chars().all(|c| c.is_ascii_digit() || c == '.')
        && version.chars().next().is_some_and(|c| c.is_ascii_digit());
    valid.then(|| format!("netcoreapp{}", version))
}

impl TaskFlow for DotnetTaskFlow {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Dotnet
    }

    fn steps(&self, stage: &Stage, ctx: &StrategyContext) -> Result<Vec<Step>, StepError> {
        match stage {
            Stage::Install => Ok(vec![Step::Run(
                CommandSpec::new("dotnet", &ctx.source_dir).arg("restore"),
            )]),
            Stage::Build => {
                let mut publish = CommandSpec::new("dotnet", &ctx.source_dir)
                    .args(["publish", "-c", "Release", "-o"])
                    .arg(ctx.artifact_dir.to_string_lossy());
                if let Some(framework) = target_framework(ctx.effective_runtime()) {
                    publish = publish.args(["-f".to_string(), framework]);
                }
                Ok(vec![Step::Run(publish)])
            }
            Stage::Custom(_) => Ok(vec![]),
        }
    }
}
