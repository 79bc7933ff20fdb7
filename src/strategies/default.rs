//! Fallback strategy used when no manifest matches: ship the sources as-is.

use super::{Step, StepError, StrategyContext, TaskFlow};
use crate::stack::{Stage, StrategyKind};

pub struct DefaultTaskFlow;

impl TaskFlow for DefaultTaskFlow {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Default
    }

    fn steps(&self, stage: &Stage, _ctx: &StrategyContext) -> Result<Vec<Step>, StepError> {
        match stage {
            Stage::Install => Ok(vec![Step::CopySource]),
            Stage::Build | Stage::Custom(_) => Ok(vec![]),
        }
    }
}
