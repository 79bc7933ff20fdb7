//! Maven strategy (Java runtimes)

use super::{Step, StepError, StrategyContext, TaskFlow};
use crate::exec::CommandSpec;
use crate::stack::{Stage, StrategyKind};

pub struct MavenTaskFlow;

impl TaskFlow for MavenTaskFlow {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Maven
    }

    fn steps(&self, stage: &Stage, ctx: &StrategyContext) -> Result<Vec<Step>, StepError> {
        let mvn = |goals: &[&str]| {
            let mut spec = CommandSpec::new("mvn", &ctx.source_dir).arg("-B");
            if let Some(settings) = ctx.option_str("maven_settings") {
                spec = spec.args(["-s", settings]);
            }
            spec.args(goals.iter().copied())
        };

        match stage {
            Stage::Install => Ok(vec![Step::Run(mvn(&["dependency:resolve"]))]),
            Stage::Build => Ok(vec![
                Step::Run(mvn(&["package", "-DskipTests"])),
                Step::CollectArtifacts("target/*.jar".to_string()),
                Step::CollectArtifacts("target/*.zip".to_string()),
            ]),
            Stage::Custom(_) => Ok(vec![]),
        }
    }
}
