use crate::error::{PackError, PackResult};
use crate::installer;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::TargetPhase;
use crate::pipeline::state::{TargetStage, TargetState};
use async_trait::async_trait;
use tracing::debug;

/// Plans the installer command; for the legacy build image this also stages
/// the shell wrapper the container runs instead of the installer
pub struct PreinstallPhase;

#[async_trait]
impl TargetPhase for PreinstallPhase {
    fn name(&self) -> &'static str {
        "PreinstallPhase"
    }

    fn reaches(&self) -> TargetStage {
        TargetStage::PreinstallDone
    }

    async fn execute(&self, context: &PipelineContext, state: &mut TargetState) -> PackResult<()> {
        let options = &context.options;
        let runtime = state.runtime().to_string();

        if installer::needs_legacy_wrapper(&runtime, options.use_container) {
            let wrapper = context.path(&state.layout.legacy_script);
            context
                .file_system
                .write_atomic(&wrapper, &installer::legacy_wrapper_script(&state.layout))
                .map_err(|e| PackError::io(format!("Failed to stage {}", wrapper.display()), e))?;
            state.staged.push(state.layout.legacy_script.clone());
        }

        let command = if options.use_container {
            installer::plan_container(&state.layout, &context.service_dir, &runtime)
        } else {
            installer::plan_local(&state.layout, &options.python_for(&runtime))
        };
        debug!(function = state.name(), command = %command.display(), "Planned install");
        state.install_command = Some(command);
        Ok(())
    }
}
