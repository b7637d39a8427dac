use crate::cleaner::{self, RemovalPolicy};
use crate::error::PackResult;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::TargetPhase;
use crate::pipeline::state::{TargetStage, TargetState};
use async_trait::async_trait;
use tracing::info;

/// Removes the shim and the library directory; artifacts that were never
/// created or are already gone are not an error
pub struct RemoveArtifactsPhase;

#[async_trait]
impl TargetPhase for RemoveArtifactsPhase {
    fn name(&self) -> &'static str {
        "RemoveArtifactsPhase"
    }

    fn reaches(&self) -> TargetStage {
        TargetStage::ArtifactsRemoved
    }

    async fn execute(&self, context: &PipelineContext, state: &mut TargetState) -> PackResult<()> {
        let paths = [
            context.path(&state.layout.shim_file),
            context.path(&state.layout.lib_dir),
        ];
        let summary = cleaner::remove(context.file_system.as_ref(), &paths, RemovalPolicy::Soft)?;

        info!(
            function = state.name(),
            removed = summary.removed.len(),
            missing = summary.missing.len(),
            failed = summary.failed.len(),
            "Removed generated artifacts"
        );
        Ok(())
    }
}
