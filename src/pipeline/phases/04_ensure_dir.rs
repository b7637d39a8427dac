use crate::error::{PackError, PackResult};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::TargetPhase;
use crate::pipeline::state::{TargetStage, TargetState};
use async_trait::async_trait;

pub struct EnsureDirPhase;

#[async_trait]
impl TargetPhase for EnsureDirPhase {
    fn name(&self) -> &'static str {
        "EnsureDirPhase"
    }

    fn reaches(&self) -> TargetStage {
        TargetStage::DirEnsured
    }

    async fn execute(&self, context: &PipelineContext, state: &mut TargetState) -> PackResult<()> {
        let lib_dir = context.path(&state.layout.lib_dir);
        context
            .file_system
            .create_dir_all(&lib_dir)
            .map_err(|e| PackError::io(format!("Failed to create {}", lib_dir.display()), e))
    }
}
