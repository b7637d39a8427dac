use crate::error::{PackError, PackResult};
use crate::installer::INSTALLER_SCRIPT;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::TargetPhase;
use crate::pipeline::state::{TargetStage, TargetState};
use async_trait::async_trait;
use tracing::debug;

/// Writes the installer script into the library directory
pub struct StageInstallerPhase;

#[async_trait]
impl TargetPhase for StageInstallerPhase {
    fn name(&self) -> &'static str {
        "StageInstallerPhase"
    }

    fn reaches(&self) -> TargetStage {
        TargetStage::InstallerStaged
    }

    async fn execute(&self, context: &PipelineContext, state: &mut TargetState) -> PackResult<()> {
        let script = context.path(&state.layout.installer_script);
        context
            .file_system
            .write_atomic(&script, INSTALLER_SCRIPT)
            .map_err(|e| PackError::io(format!("Failed to stage {}", script.display()), e))?;

        debug!(function = state.name(), script = %script.display(), "Staged installer");
        state.staged.push(state.layout.installer_script.clone());
        Ok(())
    }
}
