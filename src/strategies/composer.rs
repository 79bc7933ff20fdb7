//! Composer strategy (PHP runtimes)

use super::{Step, StepError, StrategyContext, TaskFlow};
use crate::exec::CommandSpec;
use crate::stack::{Stage, StrategyKind};

pub struct ComposerTaskFlow;

impl TaskFlow for ComposerTaskFlow {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Composer
    }

    fn steps(&self, stage: &Stage, ctx: &StrategyContext) -> Result<Vec<Step>, StepError> {
        match stage {
            Stage::Install => Ok(vec![
                Step::CopySource,
                Step::Run(CommandSpec::new("composer", &ctx.artifact_dir).args([
                    "install",
                    "--no-dev",
                    "--no-interaction",
                    "--optimize-autoloader",
                ])),
            ]),
            Stage::Build | Stage::Custom(_) => Ok(vec![]),
        }
    }
}
