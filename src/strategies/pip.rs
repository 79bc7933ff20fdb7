//! pip strategy (Python runtimes)

use super::{Step, StepError, StrategyContext, TaskFlow};
use crate::exec::CommandSpec;
use crate::stack::{Stage, StrategyKind};

pub struct PipTaskFlow;

impl PipTaskFlow {
    fn pip_program(ctx: &StrategyContext) -> &'static str {
        if ctx.effective_runtime().starts_with("python2") {
            "pip"
        } else {
            "pip3"
        }
    }
}

impl TaskFlow for PipTaskFlow {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pip
    }

    fn steps(&self, stage: &Stage, ctx: &StrategyContext) -> Result<Vec<Step>, StepError> {
        match stage {
            Stage::Install => {
                let mut install = CommandSpec::new(Self::pip_program(ctx), &ctx.artifact_dir)
                    .args(["install", "-t", ".", "-r", "requirements.txt"]);
                if let Some(index) = ctx.option_str("index_url") {
                    install = install.args(["-i", index]);
                }
                Ok(vec![Step::CopySource, Step::Run(install)])
            }
            Stage::Build | Stage::Custom(_) => Ok(vec![]),
        }
    }
}
