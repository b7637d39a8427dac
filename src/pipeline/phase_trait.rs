use super::context::PipelineContext;
use super::state::{TargetStage, TargetState};
use crate::error::PackResult;
use async_trait::async_trait;

/// One step of a target's pipeline. A phase that returns `Ok` moves the
/// target to [`TargetPhase::reaches`].
#[async_trait]
pub trait TargetPhase: Send + Sync {
    fn name(&self) -> &'static str;

    fn reaches(&self) -> TargetStage;

    async fn execute(&self, context: &PipelineContext, state: &mut TargetState) -> PackResult<()>;
}
