use crate::cleaner::{self, RemovalPolicy};
use crate::error::PackResult;
use crate::installer::container;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::TargetPhase;
use crate::pipeline::state::{TargetStage, TargetState};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Returns container-written files to the invoking user and drops the
/// staged scripts when cleanup is on
pub struct PostinstallPhase;

#[async_trait]
impl TargetPhase for PostinstallPhase {
    fn name(&self) -> &'static str {
        "PostinstallPhase"
    }

    fn reaches(&self) -> TargetStage {
        TargetStage::PostinstallDone
    }

    async fn execute(&self, context: &PipelineContext, state: &mut TargetState) -> PackResult<()> {
        let options = &context.options;

        if options.use_container {
            if container::ownership_fix_supported() {
                container::fix_ownership(
                    context.runner.as_ref(),
                    &context.service_dir,
                    state.runtime(),
                    &state.layout.lib_dir,
                )
                .await?;
            } else {
                debug!("Skipping ownership fix on this host");
            }
        }

        if options.cleanup_enabled && !state.staged.is_empty() {
            let staged: Vec<PathBuf> = state.staged.iter().map(|p| context.path(p)).collect();
            cleaner::remove(context.file_system.as_ref(), &staged, RemovalPolicy::Soft)?;
            state.staged.clear();
        }
        Ok(())
    }
}
