use crate::error::{PackError, PackResult};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::TargetPhase;
use crate::pipeline::state::{TargetStage, TargetState};
use async_trait::async_trait;
use tracing::debug;

/// Requires a readable requirements manifest next to the shim
pub struct ValidateInputsPhase;

#[async_trait]
impl TargetPhase for ValidateInputsPhase {
    fn name(&self) -> &'static str {
        "ValidateInputsPhase"
    }

    fn reaches(&self) -> TargetStage {
        TargetStage::InputValidated
    }

    async fn execute(&self, context: &PipelineContext, state: &mut TargetState) -> PackResult<()> {
        let manifest = context.path(&state.layout.manifest);
        let fs = context.file_system.as_ref();

        if !fs.is_file(&manifest) || fs.read_to_string(&manifest).is_err() {
            return Err(PackError::ManifestMissing {
                path: state.layout.manifest.clone(),
            });
        }

        debug!(function = state.name(), manifest = %manifest.display(), "Manifest found");
        Ok(())
    }
}
